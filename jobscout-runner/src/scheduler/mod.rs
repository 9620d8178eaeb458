//! Scheduler layer for the runner
//!
//! This layer drives remote jobs from submission to export. The poller
//! waits for one job to become terminal; the orchestrator runs one task end
//! to end and fans a whole plan out concurrently.

pub mod orchestrator;
pub mod poller;

pub use orchestrator::{RunReport, TaskOrchestrator, TaskOutcome, TaskRecord};
pub use poller::{JobPoller, PollPolicy};
