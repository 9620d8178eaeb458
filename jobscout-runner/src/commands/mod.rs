//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;
mod payload;
mod run;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use jobscout_client::ScraperClient;
use jobscout_core::payload::PayloadTemplate;
use std::path::PathBuf;
use tracing::info;

use crate::config::{Config, ConfigArgs};
use crate::plan::TaskPlan;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scrape every query in every location and write one CSV per pair
    Run(PlanArgs),
    /// Print the payloads `run` would submit, without contacting the API
    Payload(PlanArgs),
    /// Show the status of a submitted job
    Status {
        /// Job identifier returned at submission
        job_id: String,
    },
    /// Fetch the results of a finished job and export them
    Fetch {
        /// Job identifier returned at submission
        job_id: String,

        /// Search query the job was submitted for
        #[arg(short, long)]
        query: String,

        /// Location the job was submitted for
        #[arg(short, long)]
        location: String,

        /// Google country domain the job was submitted for
        #[arg(short, long, default_value = "com")]
        country: String,
    },
}

/// Inputs shared by commands that work on a task plan
#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    /// Task plan JSON file (queries and locations)
    #[arg(short, long, env = "JOBSCOUT_PLAN")]
    pub plan: PathBuf,

    /// Payload template JSON file; the built-in Google Jobs template otherwise
    #[arg(long, env = "JOBSCOUT_PAYLOAD")]
    pub payload: Option<PathBuf>,
}

impl PlanArgs {
    fn load(&self) -> Result<(TaskPlan, PayloadTemplate)> {
        let plan = TaskPlan::from_file(&self.plan)?;

        let template = match &self.payload {
            Some(path) => PayloadTemplate::from_file(path)
                .with_context(|| format!("Failed to load payload template {}", path.display()))?,
            None => PayloadTemplate::google_jobs(),
        };

        Ok((plan, template))
    }
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `args` - Connection and polling settings from flags and environment
pub async fn handle_command(command: Commands, args: ConfigArgs) -> Result<()> {
    let config = Config::from(args);

    match command {
        Commands::Run(plan) => run::handle_run(&plan, &config).await,
        Commands::Payload(plan) => payload::handle_payload(&plan),
        Commands::Status { job_id } => job::handle_status(&job_id, &config).await,
        Commands::Fetch {
            job_id,
            query,
            location,
            country,
        } => job::handle_fetch(&job_id, &query, &country, &location, &config).await,
    }
}

/// Validates the configuration and builds the shared API client
fn connect(config: &Config) -> Result<ScraperClient> {
    config.validate()?;

    let client = ScraperClient::with_client(
        config.api_url.clone(),
        config.credentials.clone(),
        config.http_client()?,
    );
    info!(
        "Scraping API client initialized: url={}, user={}",
        client.base_url(),
        config.credentials.username()
    );

    Ok(client)
}
