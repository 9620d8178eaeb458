//! Jobs repository
//!
//! Handles communication with the scraping API for job-related operations:
//! - Submitting jobs
//! - Polling job status
//! - Fetching job results

use async_trait::async_trait;
use jobscout_client::{ClientError, ScraperClient};
use jobscout_core::domain::job::{JobId, JobStatus};
use jobscout_core::domain::listing::JobListing;
use jobscout_core::payload::Payload;

/// Repository trait for job operations against the scraping API
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Submits a job and returns its remote identifier
    ///
    /// # Arguments
    /// * `payload` - The task's own payload copy
    async fn submit(&self, payload: &Payload) -> Result<JobId, ClientError>;

    /// Reads the current status of a job
    ///
    /// # Arguments
    /// * `job_id` - The job to check
    async fn poll_status(&self, job_id: &JobId) -> Result<JobStatus, ClientError>;

    /// Reads the parsed listings of a finished job
    ///
    /// # Arguments
    /// * `job_id` - The finished job
    async fn fetch_results(&self, job_id: &JobId) -> Result<Vec<JobListing>, ClientError>;
}

#[async_trait]
impl JobRepository for ScraperClient {
    async fn submit(&self, payload: &Payload) -> Result<JobId, ClientError> {
        ScraperClient::submit(self, payload).await
    }

    async fn poll_status(&self, job_id: &JobId) -> Result<JobStatus, ClientError> {
        ScraperClient::poll_status(self, job_id).await
    }

    async fn fetch_results(&self, job_id: &JobId) -> Result<Vec<JobListing>, ClientError> {
        ScraperClient::fetch_results(self, job_id).await
    }
}
