//! Task domain type
//!
//! A task is one (query, country, location) combination. It drives exactly
//! one remote job and produces at most one output file.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use url::Url;

/// Local unit of work
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Task {
    query: String,
    country_code: String,
    location: String,
}

impl Task {
    pub fn new(
        query: impl Into<String>,
        country_code: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            query: query.into(),
            country_code: country_code.into(),
            location: location.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// Google Jobs search URL for this task
    ///
    /// The country code selects the Google domain (`com`, `co.uk`, ...), the
    /// query is form-encoded into `q`.
    pub fn search_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!(
            "https://www.google.{}/search",
            self.country_code.trim()
        ))?;
        url.query_pairs_mut().append_pair("q", &self.query);

        // `ibp=htl;jobs` must keep its literal semicolon
        let query = format!("{}&ibp=htl;jobs&hl=en", url.query().unwrap_or_default());
        url.set_query(Some(&query));

        Ok(url)
    }

    /// Deterministic CSV file name for this task
    ///
    /// `developer` in `California,United States` gives
    /// `developer_jobs_California_United_States.csv`.
    pub fn output_file_name(&self) -> String {
        format!(
            "{}_jobs_{}.csv",
            sanitize_component(&self.query),
            sanitize_component(&self.location)
        )
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' in '{}' (google.{})",
            self.query, self.location, self.country_code
        )
    }
}

/// Replaces every run of non-alphanumeric characters with a single `_`
///
/// Leading and trailing separators are dropped.
pub fn sanitize_component(input: &str) -> String {
    input
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// First pair of tasks that would write the same output file
///
/// Sanitizing can map distinct queries (`c++`, `c#`) to one file name, and
/// the country is not part of the name.
pub fn find_output_conflict(tasks: &[Task]) -> Option<(&Task, &Task)> {
    let mut owners: HashMap<String, &Task> = HashMap::new();
    for task in tasks {
        if let Some(owner) = owners.insert(task.output_file_name(), task) {
            return Some((owner, task));
        }
    }
    None
}

/// Builds the Cartesian product of locations and queries
///
/// Tasks are ordered by country, then location, then query.
pub fn expand_tasks(queries: &[String], locations: &BTreeMap<String, Vec<String>>) -> Vec<Task> {
    locations
        .iter()
        .flat_map(|(country, locations)| {
            locations.iter().flat_map(move |location| {
                queries
                    .iter()
                    .map(move |query| Task::new(query.clone(), country.clone(), location.clone()))
            })
        })
        .collect()
}
