//! Jobscout Runner
//!
//! Scrapes Google Jobs listings through a queue-based SERP scraping API and
//! writes one CSV file per (query, location) pair.
//!
//! Architecture:
//! - Configuration: Settings from flags and environment
//! - Repository: Job operations against the scraping API
//! - Services: CSV export
//! - Scheduler: Status polling and concurrent task fan-out
//!
//! Every task submits its own payload, polls the job until it is done or
//! failed, fetches the parsed listings and exports them. All tasks run
//! concurrently on a single-threaded runtime and share one HTTP client.

mod commands;
mod config;
mod error;
mod plan;
mod repository;
mod scheduler;
mod service;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Commands, handle_command};
use crate::config::ConfigArgs;

/// Log directives used when `RUST_LOG` is unset
///
/// The binary is named `jobscout`, so that is the target of its own events.
const DEFAULT_LOG_FILTER: &str = "jobscout=info,jobscout_client=info";

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(about = "Google Jobs scraping through a SERP scraping API", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    handle_command(cli.command, cli.config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_filter_covers_binary_target() {
        // Events from any module of the binary carry this crate prefix
        let target = module_path!().split("::").next().unwrap();

        assert_eq!(target, "jobscout");
        assert!(
            DEFAULT_LOG_FILTER
                .split(',')
                .any(|directive| directive == format!("{}=info", target))
        );
        assert!(DEFAULT_LOG_FILTER.parse::<tracing_subscriber::EnvFilter>().is_ok());
    }
}
