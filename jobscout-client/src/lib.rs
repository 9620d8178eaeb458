//! Jobscout HTTP Client
//!
//! A small, typed client for the queue-based scraping API. Jobs are created
//! with a payload, polled by id until they are terminal, and their parsed
//! results are read back.
//!
//! # Example
//!
//! ```no_run
//! use jobscout_client::{Credentials, ScraperClient};
//! use jobscout_core::domain::task::Task;
//! use jobscout_core::payload::PayloadTemplate;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ScraperClient::new(
//!         "https://data.oxylabs.io/v1/queries",
//!         Credentials::new("user", "pass"),
//!     );
//!
//!     let task = Task::new("developer", "com", "California,United States");
//!     let payload = PayloadTemplate::google_jobs().for_task(&task)?;
//!     let job_id = client.submit(&payload).await?;
//!
//!     println!("Submitted job: {}", job_id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::fmt;

/// HTTP basic credentials for the scraping API
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_empty(&self) -> bool {
        self.username.is_empty() || self.password.is_empty()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// HTTP client for the scraping API
///
/// Cloning is cheap: clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct ScraperClient {
    /// Queries endpoint (e.g., "https://data.oxylabs.io/v1/queries")
    base_url: String,
    /// Credentials sent with every request
    credentials: Credentials,
    /// HTTP client instance
    client: Client,
}

impl ScraperClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The queries endpoint of the scraping API
    /// * `credentials` - Basic auth credentials
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self::with_client(base_url, credentials, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use jobscout_client::{Credentials, ScraperClient};
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ScraperClient::with_client(
    ///     "https://data.oxylabs.io/v1/queries",
    ///     Credentials::new("user", "pass"),
    ///     http_client,
    /// );
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        credentials: Credentials,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
            client,
        }
    }

    /// Get the queries endpoint
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(
            &self.credentials.username,
            Some(&self.credentials.password),
        )
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Credential rejections map to `Auth`, other failure codes to `Api`, and
    /// bodies that do not deserialize to `Protocol`.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::from_status(status.as_u16(), error_text));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::protocol(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ScraperClient::new(
            "https://data.oxylabs.io/v1/queries",
            Credentials::new("user", "pass"),
        );
        assert_eq!(client.base_url(), "https://data.oxylabs.io/v1/queries");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ScraperClient::new(
            "https://data.oxylabs.io/v1/queries/",
            Credentials::new("user", "pass"),
        );
        assert_eq!(client.base_url(), "https://data.oxylabs.io/v1/queries");
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("user", "hunter2"));
        assert!(debug.contains("user"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_empty_credentials() {
        assert!(Credentials::new("", "pass").is_empty());
        assert!(Credentials::new("user", "").is_empty());
        assert!(!Credentials::new("user", "pass").is_empty());
    }
}
