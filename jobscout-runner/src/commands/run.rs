//! Run command handler
//!
//! Fans the whole task plan out against the scraping API and prints a
//! summary of every task.

use anyhow::Result;
use colored::*;
use std::sync::Arc;
use tracing::{info, warn};

use super::{PlanArgs, connect};
use crate::config::Config;
use crate::scheduler::{RunReport, TaskOrchestrator, TaskOutcome, TaskRecord};
use crate::service::CsvExporter;

/// Handle the run command
///
/// Fails when any task did not produce its file.
pub async fn handle_run(args: &PlanArgs, config: &Config) -> Result<()> {
    let (plan, template) = args.load()?;
    let client = connect(config)?;

    info!(
        "Loaded plan: {} quer(ies) x {} location(s)",
        plan.queries.len(),
        plan.location_count()
    );
    info!(
        "Poll policy: initial delay {:?}, interval {:?}, max {} check(s)",
        config.initial_delay, config.poll_interval, config.max_poll_attempts
    );

    let exporter = CsvExporter::new(&config.output_dir);
    let orchestrator = TaskOrchestrator::new(
        config,
        Arc::new(client),
        Arc::new(exporter.clone()),
        Arc::new(template),
    );

    let report = orchestrator.run_all(&plan.queries, &plan.locations).await;

    print_report(&report, &exporter);

    if report.failed() > 0 {
        for record in report.failures() {
            warn!("No output for {}", record.task);
        }
        anyhow::bail!(
            "{} of {} task(s) did not produce output",
            report.failed(),
            report.total()
        );
    }

    Ok(())
}

/// Print the per-task summary of a run
fn print_report(report: &RunReport, exporter: &CsvExporter) {
    println!();
    println!(
        "{}",
        format!(
            "Finished {} task(s), output in {}:",
            report.total(),
            exporter.output_dir().display()
        )
        .bold()
    );
    println!();

    for record in &report.records {
        print_record(record);
    }

    let summary = format!(
        "{} exported, {} without output",
        report.succeeded(),
        report.failed()
    );
    if report.failed() == 0 {
        println!("{}", summary.green());
    } else {
        println!("{}", summary.yellow());
    }
}

fn print_record(record: &TaskRecord) {
    let seconds = record
        .finished_at
        .signed_duration_since(record.started_at)
        .num_seconds();

    match &record.outcome {
        TaskOutcome::Exported {
            job_id,
            path,
            listings,
        } => {
            println!("  {} {}", "✓".green(), record.task);
            println!("    Job:      {}", job_id.to_string().dimmed());
            println!("    Listings: {}", listings);
            println!("    File:     {}", path.display());
        }
        TaskOutcome::JobFailed { job_id } => {
            println!("  {} {}", "✗".red(), record.task);
            println!("    Job:      {}", job_id.to_string().dimmed());
            println!("    Status:   {}", "failed".red());
        }
        TaskOutcome::Errored(e) => {
            println!("  {} {}", "✗".red(), record.task);
            println!("    Error:    {}", e.to_string().red());
        }
    }
    println!("    Duration: {}s", seconds);
    println!();
}
