//! Payload command handler
//!
//! Prints the payload each task of a plan would submit.

use anyhow::{Context, Result};
use colored::*;

use super::PlanArgs;

pub fn handle_payload(args: &PlanArgs) -> Result<()> {
    let (plan, template) = args.load()?;
    let tasks = plan.tasks();

    println!("{}", format!("{} task(s):", tasks.len()).bold());
    println!();

    for task in &tasks {
        let payload = template
            .for_task(task)
            .with_context(|| format!("Failed to build payload for {}", task))?;

        println!("  {} {}", "▸".cyan(), task);
        println!("    File: {}", task.output_file_name().dimmed());
        println!("{}", serde_json::to_string_pretty(&payload)?);
        println!();
    }

    Ok(())
}
