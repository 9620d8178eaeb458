//! Scraping payload
//!
//! A `PayloadTemplate` holds the static part of a scraping request (source,
//! rendering mode, parsing instructions). It is built once and never mutated.
//! Each task gets its own `Payload` copy with `url` and `geo_location` set, so
//! concurrently running tasks cannot observe each other's overrides.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::task::Task;

pub const KEY_SOURCE: &str = "source";
pub const KEY_URL: &str = "url";
pub const KEY_GEO_LOCATION: &str = "geo_location";

/// Errors raised while loading a template or building a task payload
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("Failed to read payload template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid payload JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload template must be a JSON object")]
    NotAnObject,

    #[error("Payload template is missing a non-empty \"source\" string")]
    MissingSource,

    #[error("Cannot build search URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Request body submitted for a single task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn url(&self) -> Option<&str> {
        self.0.get(KEY_URL).and_then(Value::as_str)
    }

    pub fn geo_location(&self) -> Option<&str> {
        self.0.get(KEY_GEO_LOCATION).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Immutable base configuration shared by all tasks of a run
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadTemplate {
    base: Map<String, Value>,
}

impl PayloadTemplate {
    /// Default template: Google Jobs page rendered as HTML and parsed into a
    /// `jobs` list with the seven listing fields.
    pub fn google_jobs() -> Self {
        let parsing_instructions = json!({
            "jobs": {
                "_fns": [{
                    "_fn": "xpath",
                    "_args": ["//div[@class='nJXhWc']//ul/li"]
                }],
                "_items": {
                    "job_title": xpath_one(".//div[@class='BjJfJf PUpOsf']/text()"),
                    "company_name": xpath_one(".//div[@class='vNEEBe']/text()"),
                    "location": xpath_one(".//div[@class='Qk80Jf'][1]/text()"),
                    "date": xpath_one(".//span[@class='LL4CDc' and contains(@aria-label, 'Posted')]/span/text()"),
                    "salary": xpath_one(".//span[@aria-label='Salary']/text()"),
                    "posted_via": xpath_one(".//div[@class='Qk80Jf'][2]/text()"),
                    "URL": xpath_one(".//div[@data-share-url]/@data-share-url")
                }
            }
        });

        let mut base = Map::new();
        base.insert(KEY_SOURCE.to_string(), json!("google"));
        base.insert("user_agent_type".to_string(), json!("desktop"));
        base.insert("render".to_string(), json!("html"));
        base.insert("parse".to_string(), json!(true));
        base.insert("parsing_instructions".to_string(), parsing_instructions);

        Self { base }
    }

    /// Loads a template from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PayloadError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| PayloadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&contents)
    }

    /// Parses a template from a JSON document
    ///
    /// `url` and `geo_location` may be present as placeholders; they are
    /// overwritten for every task.
    pub fn from_json(json: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(base) = value else {
            return Err(PayloadError::NotAnObject);
        };

        let has_source = base
            .get(KEY_SOURCE)
            .and_then(Value::as_str)
            .is_some_and(|source| !source.trim().is_empty());
        if !has_source {
            return Err(PayloadError::MissingSource);
        }

        Ok(Self { base })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.base.get(key)
    }

    /// Builds the payload for one task on a private copy of the template
    pub fn for_task(&self, task: &Task) -> Result<Payload, PayloadError> {
        let url = task.search_url()?;

        let mut payload = self.base.clone();
        payload.insert(KEY_URL.to_string(), Value::String(url.into()));
        payload.insert(
            KEY_GEO_LOCATION.to_string(),
            Value::String(task.location().to_string()),
        );

        Ok(Payload(payload))
    }
}

impl Default for PayloadTemplate {
    fn default() -> Self {
        Self::google_jobs()
    }
}

fn xpath_one(expr: &str) -> Value {
    json!({ "_fns": [{ "_fn": "xpath_one", "_args": [expr] }] })
}
