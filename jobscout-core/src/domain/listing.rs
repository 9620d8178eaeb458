//! Job listing domain type

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One parsed job listing returned by the scraping service
///
/// Every field is optional: which ones are present depends on the page the
/// service rendered. Values that arrive as numbers or lists of text nodes are
/// normalized to a single string; blank values become `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(default, deserialize_with = "text")]
    pub job_title: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub posted_via: Option<String>,
    #[serde(rename = "URL", alias = "url", default, deserialize_with = "text")]
    pub url: Option<String>,
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(text_of))
}

fn text_of(value: Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(text_of)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Null | Value::Object(_) => return None,
    };

    if text.is_empty() { None } else { Some(text) }
}
