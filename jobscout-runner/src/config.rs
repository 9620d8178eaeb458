//! Runner configuration
//!
//! Defines all configurable parameters for a run including the scraping API
//! endpoint, credentials, polling intervals, concurrency and output location.
//! Every value can be set with a flag or its environment variable.

use anyhow::Context;
use clap::Args;
use jobscout_client::Credentials;
use std::path::PathBuf;
use std::time::Duration;

use crate::scheduler::PollPolicy;

pub const DEFAULT_API_URL: &str = "https://data.oxylabs.io/v1/queries";

/// Command-line and environment sources for `Config`
#[derive(Debug, Clone, Args)]
pub struct ConfigArgs {
    /// Queries endpoint of the scraping API
    #[arg(long, global = true, env = "JOBSCOUT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// API username
    #[arg(long, global = true, env = "JOBSCOUT_USERNAME")]
    pub username: Option<String>,

    /// API password
    #[arg(long, global = true, env = "JOBSCOUT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Directory the CSV files are written to
    #[arg(long, global = true, env = "JOBSCOUT_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Seconds to wait after submitting before the first status check
    #[arg(long, global = true, env = "JOBSCOUT_INITIAL_DELAY", default_value_t = 15)]
    pub initial_delay: u64,

    /// Seconds between status checks
    #[arg(long, global = true, env = "JOBSCOUT_POLL_INTERVAL", default_value_t = 5)]
    pub poll_interval: u64,

    /// Status checks before a job is given up on
    #[arg(long, global = true, env = "JOBSCOUT_MAX_POLL_ATTEMPTS", default_value_t = 60)]
    pub max_poll_attempts: u32,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true, env = "JOBSCOUT_REQUEST_TIMEOUT", default_value_t = 60)]
    pub request_timeout: u64,

    /// Maximum number of tasks with a remote job in flight
    #[arg(long, global = true, env = "JOBSCOUT_MAX_CONCURRENT_TASKS", default_value_t = 8)]
    pub max_concurrent_tasks: usize,
}

/// Run configuration
///
/// Built once in `main` and passed explicitly to the client and scheduler.
#[derive(Debug, Clone)]
pub struct Config {
    /// Queries endpoint of the scraping API
    pub api_url: String,

    /// Basic auth credentials
    pub credentials: Credentials,

    /// Directory the CSV files are written to
    pub output_dir: PathBuf,

    /// Wait before the first status check, lets the remote job start
    pub initial_delay: Duration,

    /// Wait between status checks
    pub poll_interval: Duration,

    /// Status checks before a job times out
    pub max_poll_attempts: u32,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,

    /// Max tasks with a remote job in flight
    pub max_concurrent_tasks: usize,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(credentials: Credentials) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials,
            output_dir: PathBuf::from("."),
            initial_delay: Duration::from_secs(15),
            poll_interval: Duration::from_secs(5),
            max_poll_attempts: 60,
            request_timeout: Duration::from_secs(60),
            max_concurrent_tasks: 8,
        }
    }

    /// Polling schedule derived from this configuration
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            initial_delay: self.initial_delay,
            interval: self.poll_interval,
            max_attempts: self.max_poll_attempts,
        }
    }

    /// Builds the shared HTTP client
    pub fn http_client(&self) -> anyhow::Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build HTTP client")
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.credentials.is_empty() {
            anyhow::bail!(
                "API credentials are required (--username/--password or JOBSCOUT_USERNAME/JOBSCOUT_PASSWORD)"
            );
        }

        if self.api_url.is_empty() {
            anyhow::bail!("api_url cannot be empty");
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            anyhow::bail!("api_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_poll_attempts == 0 {
            anyhow::bail!("max_poll_attempts must be greater than 0");
        }

        if self.max_concurrent_tasks == 0 {
            anyhow::bail!("max_concurrent_tasks must be greater than 0");
        }

        Ok(())
    }
}

impl From<ConfigArgs> for Config {
    fn from(args: ConfigArgs) -> Self {
        Self {
            api_url: args.api_url,
            credentials: Credentials::new(
                args.username.unwrap_or_default(),
                args.password.unwrap_or_default(),
            ),
            output_dir: args.output_dir,
            initial_delay: Duration::from_secs(args.initial_delay),
            poll_interval: Duration::from_secs(args.poll_interval),
            max_poll_attempts: args.max_poll_attempts,
            request_timeout: Duration::from_secs(args.request_timeout),
            max_concurrent_tasks: args.max_concurrent_tasks,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Credentials::new("", ""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::new(Credentials::new("user", "pass"))
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.initial_delay, Duration::from_secs(15));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.max_poll_attempts, 60);

        // No credentials yet
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = valid_config();

        // Valid config should pass
        assert!(config.validate().is_ok());

        // Invalid URL should fail
        config.api_url = "not-a-url".to_string();
        assert!(config.validate().is_err());
        config.api_url = DEFAULT_API_URL.to_string();

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
        config.poll_interval = Duration::from_secs(5);

        config.max_poll_attempts = 0;
        assert!(config.validate().is_err());
        config.max_poll_attempts = 60;

        config.max_concurrent_tasks = 0;
        assert!(config.validate().is_err());
        config.max_concurrent_tasks = 8;

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_policy() {
        let config = valid_config();
        let policy = config.poll_policy();

        assert_eq!(policy.initial_delay, Duration::from_secs(15));
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, 60);
    }

    #[test]
    fn test_from_args() {
        let args = ConfigArgs {
            api_url: "http://localhost:9000/v1/queries".to_string(),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            output_dir: PathBuf::from("out"),
            initial_delay: 1,
            poll_interval: 2,
            max_poll_attempts: 3,
            request_timeout: 4,
            max_concurrent_tasks: 5,
        };

        let config = Config::from(args);

        assert_eq!(config.credentials, Credentials::new("user", "pass"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_concurrent_tasks, 5);
        assert!(config.validate().is_ok());
    }
}
