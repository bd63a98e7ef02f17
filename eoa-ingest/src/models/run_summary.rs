//! Run summaries returned to the orchestration driver

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of an incremental or manual run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub new_records: u64,
    pub updated_records: u64,
    /// Documents dropped for lack of any identifier
    pub skipped_records: u64,
    pub errors: u64,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of one backfill year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: i32,
    pub new_records: u64,
    pub updated_records: u64,
    pub total_records: u64,
    pub errors: u64,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of a multi-year backfill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillSummary {
    pub total_records: u64,
    pub years_processed: u32,
    pub error_years: Vec<i32>,
    pub completed_at: DateTime<Utc>,
}
