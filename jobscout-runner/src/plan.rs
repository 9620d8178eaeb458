//! Task plan
//!
//! The static inputs of a run: the search queries and the locations to search
//! them in, grouped by Google country domain.
//!
//! ```json
//! {
//!   "queries": ["developer", "chef"],
//!   "locations": { "com": ["California,United States"], "co.uk": ["London,England"] }
//! }
//! ```

use anyhow::{Context, Result};
use jobscout_core::domain::task::{Task, expand_tasks, find_output_conflict, sanitize_component};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPlan {
    pub queries: Vec<String>,
    pub locations: BTreeMap<String, Vec<String>>,
}

impl TaskPlan {
    /// Loads and validates a plan file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read task plan {}", path.display()))?;

        Self::from_json(&contents).with_context(|| format!("Invalid task plan {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let plan: TaskPlan = serde_json::from_str(json).context("Failed to parse task plan")?;
        plan.validate()?;
        Ok(plan)
    }

    pub fn validate(&self) -> Result<()> {
        if self.queries.is_empty() {
            anyhow::bail!("task plan has no queries");
        }

        if self.queries.iter().any(|q| q.trim().is_empty()) {
            anyhow::bail!("task plan contains an empty query");
        }

        if self.location_count() == 0 {
            anyhow::bail!("task plan has no locations");
        }

        for (country, locations) in &self.locations {
            if country.trim().is_empty() {
                anyhow::bail!("task plan contains an empty country code");
            }
            if locations.iter().any(|l| l.trim().is_empty()) {
                anyhow::bail!("task plan contains an empty location for '{}'", country);
            }
        }

        // Both end up in the output file name
        let names = self
            .queries
            .iter()
            .chain(self.locations.values().flatten());
        for name in names {
            if sanitize_component(name).is_empty() {
                anyhow::bail!(
                    "'{}' has no letters or digits to name an output file with",
                    name
                );
            }
        }

        let tasks = self.tasks();
        if let Some((first, second)) = find_output_conflict(&tasks) {
            anyhow::bail!(
                "{} and {} would both write {}",
                first,
                second,
                first.output_file_name()
            );
        }

        Ok(())
    }

    /// Total number of location entries across all countries
    pub fn location_count(&self) -> usize {
        self.locations.values().map(Vec::len).sum()
    }

    pub fn tasks(&self) -> Vec<Task> {
        expand_tasks(&self.queries, &self.locations)
    }
}
