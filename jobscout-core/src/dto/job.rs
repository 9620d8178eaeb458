//! Job DTOs for the remote scraping API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::job::{JobId, JobStatus};

/// Body returned when a job is created
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: Option<JobId>,
    pub status: Option<JobStatus>,
}

/// Body returned by a job status read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: Option<JobId>,
    pub status: Option<JobStatus>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Body returned by a job results read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub results: Vec<ResultPage>,
}

/// One page of parsed output
///
/// `content` is whatever the parsing instructions produced; the client only
/// reads its `jobs` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPage {
    pub content: Option<Value>,
}
