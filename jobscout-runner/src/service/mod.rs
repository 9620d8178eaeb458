//! Service layer
//!
//! Services contain the local business logic of a run. Today that is the CSV
//! export of fetched listings.
//!
//! Services are trait-based so the scheduler can be tested without touching
//! the filesystem layout it would use in production.

mod export;

// Re-export traits
pub use export::Exporter;

// Re-export implementations
pub use export::{CsvExporter, ExportError};
