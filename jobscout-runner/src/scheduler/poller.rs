//! Job poller
//!
//! Waits for a remote job to reach a terminal status: a fixed initial delay,
//! then status checks at a fixed interval, bounded by an attempt count.

use jobscout_core::domain::job::{JobId, JobStatus};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::debug;

use crate::error::TaskError;
use crate::repository::JobRepository;

/// Polling schedule for one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before the first status check
    pub initial_delay: Duration,
    /// Wait between status checks
    pub interval: Duration,
    /// Status checks before giving up
    pub max_attempts: u32,
}

/// Polls job status until it is terminal
#[derive(Clone)]
pub struct JobPoller {
    jobs: Arc<dyn JobRepository>,
    policy: PollPolicy,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(jobs: Arc<dyn JobRepository>, policy: PollPolicy) -> Self {
        Self { jobs, policy }
    }

    /// Waits until `job_id` is `Done` or `Failed`
    ///
    /// Returns the first terminal status observed. Statuses other than the
    /// two terminal ones keep the loop going. After `max_attempts` checks
    /// without a terminal status the job is given up with `Timeout`.
    pub async fn wait_for_completion(&self, job_id: &JobId) -> Result<JobStatus, TaskError> {
        time::sleep(self.policy.initial_delay).await;

        for attempt in 1..=self.policy.max_attempts {
            let status = self.jobs.poll_status(job_id).await?;
            debug!(
                "Job {} status: {} (check {}/{})",
                job_id, status, attempt, self.policy.max_attempts
            );

            if status.is_terminal() {
                return Ok(status);
            }

            if attempt < self.policy.max_attempts {
                time::sleep(self.policy.interval).await;
            }
        }

        Err(TaskError::Timeout {
            job_id: job_id.clone(),
            attempts: self.policy.max_attempts,
        })
    }
}
