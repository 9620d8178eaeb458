//! Task error types
//!
//! Errors here end a single task. They are collected into the run report and
//! never abort sibling tasks.

use jobscout_client::ClientError;
use jobscout_core::domain::job::JobId;
use jobscout_core::domain::task::Task;
use jobscout_core::payload::PayloadError;
use thiserror::Error;

use crate::service::ExportError;

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Failed to build payload: {0}")]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Job {job_id} did not finish after {attempts} status checks")]
    Timeout { job_id: JobId, attempts: u32 },

    #[error("Output file {file} is already written by {owner}")]
    OutputConflict { file: String, owner: Task },

    #[error("Task cancelled: {0}")]
    Cancelled(String),

    #[error("Task aborted: {0}")]
    Panicked(String),
}
