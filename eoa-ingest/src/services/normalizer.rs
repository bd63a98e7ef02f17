//! Document normalizer
//!
//! Pure transformation from a Federal Register document to a
//! [`CanonicalRecord`]. No I/O beyond warning logs.
//!
//! # Identifier fallback (first match wins)
//! 1. `executive_order_number` → `EO-<number>`
//! 2. "Executive Order <digits>" in `executive_order_notes` → `EO-<digits>`
//! 3. `document_number`, verbatim
//! 4. none → `None` (caller skips the document)
//!
//! # Issuance date fallback
//! 1. `signing_date` (YYYY-MM-DD)
//! 2. `publication_date` (YYYY-MM-DD)
//! 3. today, logged as a data-quality warning

use chrono::{NaiveDate, Utc};
use eoa_common::CanonicalRecord;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::models::SourceDocument;

/// Authority recorded when the source names none
pub const UNKNOWN_AUTHORITY: &str = "Unknown";

const DATE_FORMAT: &str = "%Y-%m-%d";

static NOTES_ORDER_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Executive Order (\d+)").expect("notes pattern is valid"));

/// Normalize a document, defaulting a missing date to today (UTC)
pub fn normalize(document: &SourceDocument) -> Option<CanonicalRecord> {
    normalize_with_today(document, Utc::now().date_naive())
}

/// Normalize with an explicit "today" for the date fallback
pub fn normalize_with_today(document: &SourceDocument, today: NaiveDate) -> Option<CanonicalRecord> {
    let id = derive_id(document)?;
    let issuance_date = derive_issuance_date(document, &id, today);

    Some(CanonicalRecord {
        title: document.title.clone().unwrap_or_default(),
        issuance_date,
        issuing_authority: non_empty(&document.president)
            .unwrap_or(UNKNOWN_AUTHORITY)
            .to_string(),
        citation: non_empty(&document.citation).map(str::to_string),
        source_url: non_empty(&document.html_url).map(str::to_string),
        summary: None,
        id,
    })
}

/// Decode a raw source document and normalize it
///
/// `Ok(None)` means the document decoded but carries no usable identifier;
/// that case is logged here.
pub fn decode_and_normalize(raw: &Value) -> Result<Option<CanonicalRecord>, serde_json::Error> {
    let document = SourceDocument::deserialize(raw)?;
    let record = normalize(&document);
    if record.is_none() {
        tracing::warn!(document = document.label(), "Skipping document with missing ID");
    }
    Ok(record)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn derive_id(document: &SourceDocument) -> Option<String> {
    if let Some(number) = non_empty(&document.executive_order_number) {
        return Some(format!("EO-{}", number));
    }

    if let Some(notes) = non_empty(&document.executive_order_notes) {
        if let Some(captures) = NOTES_ORDER_NUMBER.captures(notes) {
            return Some(format!("EO-{}", &captures[1]));
        }
    }

    non_empty(&document.document_number).map(str::to_string)
}

fn derive_issuance_date(document: &SourceDocument, id: &str, today: NaiveDate) -> NaiveDate {
    if let Some(date) = parse_date("signing_date", &document.signing_date, id) {
        return date;
    }
    if let Some(date) = parse_date("publication_date", &document.publication_date, id) {
        return date;
    }

    tracing::warn!(
        order = id,
        "Using today's date for {} due to missing signing/publication date",
        id
    );
    today
}

fn parse_date(field: &str, value: &Option<String>, id: &str) -> Option<NaiveDate> {
    let raw = non_empty(value)?;
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!(order = id, field, value = raw, "Invalid {} format", field);
            None
        }
    }
}
