//! Archived record models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Normalized, storage-ready representation of one executive order
///
/// `id` is the natural key. Timestamps are not part of this type: the store
/// sets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: String,
    pub title: String,
    pub issuance_date: NaiveDate,
    pub issuing_authority: String,
    pub citation: Option<String>,
    pub source_url: Option<String>,
    /// Reserved for later enrichment; never populated by ingestion
    pub summary: Option<String>,
}

/// A record as persisted, with store-managed timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredRecord {
    pub id: String,
    pub title: String,
    pub issuance_date: NaiveDate,
    pub issuing_authority: String,
    pub citation: Option<String>,
    pub source_url: Option<String>,
    pub summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRecord {
    /// Strip store-managed fields
    pub fn to_canonical(&self) -> CanonicalRecord {
        CanonicalRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            issuance_date: self.issuance_date,
            issuing_authority: self.issuing_authority.clone(),
            citation: self.citation.clone(),
            source_url: self.source_url.clone(),
            summary: self.summary.clone(),
        }
    }
}
