//! Federal Register wire types
//!
//! The documents endpoint is not strict about shapes: `executive_order_number`
//! arrives as a number or a string and `president` as a string or an object
//! with a `name`. Both are folded into `Option<String>` here.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One raw document from the Federal Register documents endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SourceDocument {
    /// Structured executive order number (e.g. "13985")
    #[serde(default, deserialize_with = "lenient_string")]
    pub executive_order_number: Option<String>,
    /// Free-text notes, sometimes containing "Executive Order NNNNN"
    #[serde(default, deserialize_with = "lenient_string")]
    pub executive_order_notes: Option<String>,
    /// Federal Register document number (e.g. "2021-01753")
    #[serde(default, deserialize_with = "lenient_string")]
    pub document_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// YYYY-MM-DD
    #[serde(default, deserialize_with = "lenient_string")]
    pub signing_date: Option<String>,
    /// YYYY-MM-DD
    #[serde(default, deserialize_with = "lenient_string")]
    pub publication_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub president: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub citation: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub html_url: Option<String>,
}

impl SourceDocument {
    /// Best identifier for log lines, before normalization
    pub fn label(&self) -> &str {
        self.document_number
            .as_deref()
            .or(self.executive_order_number.as_deref())
            .unwrap_or("Unknown")
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Object(map)) => map
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    })
}

/// One page of the documents endpoint
///
/// Results are kept raw so a single undecodable document fails alone
/// instead of failing the page.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PageResult {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub results: Vec<Value>,
}

/// Query filters for a documents fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilters {
    /// Issuing authority (the API's president identifier)
    pub president: Option<String>,
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl SourceFilters {
    pub fn date_range(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Default::default()
        }
    }

    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            ..Default::default()
        }
    }
}
