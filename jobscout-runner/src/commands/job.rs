//! Job command handlers
//!
//! Inspects single remote jobs: status reads and exporting the results of
//! a job submitted earlier.

use anyhow::{Context, Result};
use colored::*;
use jobscout_core::domain::job::{JobId, JobInfo, JobStatus};
use jobscout_core::domain::task::Task;

use super::connect;
use crate::config::Config;
use crate::service::{CsvExporter, Exporter};

/// Get and display a job's status
pub async fn handle_status(job_id: &str, config: &Config) -> Result<()> {
    let client = connect(config)?;
    let job = client
        .get_job(&JobId::new(job_id))
        .await
        .with_context(|| format!("Failed to read status of job {}", job_id))?;

    print_job_details(&job);

    Ok(())
}

/// Fetch a finished job's listings and export them as `run` would
pub async fn handle_fetch(
    job_id: &str,
    query: &str,
    country: &str,
    location: &str,
    config: &Config,
) -> Result<()> {
    let client = connect(config)?;
    let job_id = JobId::new(job_id);
    let task = Task::new(query, country, location);

    let listings = client
        .fetch_results(&job_id)
        .await
        .with_context(|| format!("Failed to fetch results of job {}", job_id))?;

    let exporter = CsvExporter::new(&config.output_dir);
    let path = exporter.export(&job_id, &task, &listings).await?;

    println!(
        "{} {} listing(s) written to {}",
        "✓".green(),
        listings.len(),
        path.display()
    );

    Ok(())
}

/// Print job information
fn print_job_details(job: &JobInfo) {
    println!("{}", "Job Details:".bold());
    println!("  ID:      {}", job.id.to_string().cyan());
    println!("  Status:  {}", colorize_status(&job.status));

    if let Some(created) = &job.created_at {
        println!("  Created: {}", created);
    }

    if let Some(updated) = &job.updated_at {
        println!("  Updated: {}", updated);
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Done => status_str.green(),
        JobStatus::Failed => status_str.red(),
        JobStatus::Other(_) => status_str.cyan(),
    }
}
