//! Resumable fetch checkpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::run_orchestrator::statistics::PageStats;

/// Pagination cursor and running tallies of a resumable run
///
/// `current_page` is the next page to fetch: after page N succeeds it is
/// N+1, after page N fails it stays N. Overwritten wholesale on every
/// checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchProgress {
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub new_count: u64,
    #[serde(default)]
    pub updated_count: u64,
    #[serde(default)]
    pub error_count: u64,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub last_error: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for FetchProgress {
    fn default() -> Self {
        Self::fresh()
    }
}

impl FetchProgress {
    /// Page 1 with zero counters; `total_pages` is corrected by the first response
    pub fn fresh() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            new_count: 0,
            updated_count: 0,
            error_count: 0,
            total_count: 0,
            last_error: None,
            last_updated: None,
        }
    }

    /// More pages remain under the cursor
    pub fn has_next(&self) -> bool {
        self.current_page <= self.total_pages
    }

    /// Fold a committed page in and advance the cursor
    pub fn record_page(&mut self, stats: &PageStats) {
        self.new_count += stats.new as u64;
        self.updated_count += stats.updated as u64;
        self.error_count += stats.errors as u64;
        self.total_count = self.new_count + self.updated_count;
        self.last_error = None;
        self.current_page += 1;
    }

    /// Record a page-level failure without moving the cursor
    pub fn record_failure(&mut self, message: String) {
        self.error_count += 1;
        self.last_error = Some(message);
    }
}
