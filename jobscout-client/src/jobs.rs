//! Job-related API endpoints

use crate::ScraperClient;
use crate::error::{ClientError, Result};
use jobscout_core::domain::job::{JobId, JobInfo, JobStatus};
use jobscout_core::domain::listing::JobListing;
use jobscout_core::dto::job::{ResultsResponse, StatusResponse, SubmitResponse};
use jobscout_core::payload::Payload;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

impl ScraperClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Submit a scraping job
    ///
    /// # Arguments
    /// * `payload` - The per-task payload
    ///
    /// # Returns
    /// The identifier the service assigned to the job
    pub async fn submit(&self, payload: &Payload) -> Result<JobId> {
        let request = self.client.post(&self.base_url).json(payload);
        let response = self.authorized(request).send().await?;

        let body: SubmitResponse = self.handle_response(response).await?;
        match body.id {
            Some(id) if !id.is_empty() => {
                debug!("Job {} created with status {:?}", id, body.status);
                Ok(id)
            }
            _ => Err(ClientError::protocol("Job creation response has no id")),
        }
    }

    /// Read a job's current state
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    pub async fn get_job(&self, job_id: &JobId) -> Result<JobInfo> {
        let url = self.job_url(job_id, &[])?;
        let response = self.authorized(self.client.get(url)).send().await?;

        let body: StatusResponse = self.handle_response(response).await?;
        let status = body
            .status
            .ok_or_else(|| ClientError::protocol(format!("Job {} status response has no status", job_id)))?;

        Ok(JobInfo {
            id: body.id.unwrap_or_else(|| job_id.clone()),
            status,
            created_at: body.created_at,
            updated_at: body.updated_at,
        })
    }

    /// Poll a job's status
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    pub async fn poll_status(&self, job_id: &JobId) -> Result<JobStatus> {
        Ok(self.get_job(job_id).await?.status)
    }

    /// Fetch the parsed listings of a completed job
    ///
    /// Reads `results[0].content.jobs`. A missing result page, content or
    /// `jobs` field is a protocol error; an empty `jobs` list is not.
    ///
    /// # Arguments
    /// * `job_id` - The job identifier
    pub async fn fetch_results(&self, job_id: &JobId) -> Result<Vec<JobListing>> {
        let url = self.job_url(job_id, &["results"])?;
        let response = self.authorized(self.client.get(url)).send().await?;

        let body: ResultsResponse = self.handle_response(response).await?;
        listings_from(job_id, body)
    }

    /// `<base>/<id>[/<rest>...]` with the id escaped as one path segment
    fn job_url(&self, job_id: &JobId, rest: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ClientError::protocol(format!("Invalid API url {}: {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| ClientError::protocol(format!("API url {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(job_id.as_str())
            .extend(rest);

        Ok(url)
    }
}

fn listings_from(job_id: &JobId, body: ResultsResponse) -> Result<Vec<JobListing>> {
    let page = body
        .results
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::protocol(format!("Job {} returned no results", job_id)))?;

    let content = page
        .content
        .ok_or_else(|| ClientError::protocol(format!("Job {} result has no content", job_id)))?;

    let jobs = match content {
        Value::Object(mut content) => content.remove("jobs"),
        _ => None,
    };

    match jobs {
        Some(jobs @ Value::Array(_)) => serde_json::from_value(jobs).map_err(|e| {
            ClientError::protocol(format!("Job {} listings are malformed: {}", job_id, e))
        }),
        _ => Err(ClientError::protocol(format!(
            "Job {} content has no jobs list",
            job_id
        ))),
    }
}
