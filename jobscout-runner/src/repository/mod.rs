//! Repository layer
//!
//! Repositories abstract communication with the scraping API. They provide
//! the three job operations without any business logic.
//!
//! The trait exists so the scheduler can be driven by an in-memory double in
//! tests.

mod jobs;

pub use jobs::JobRepository;
