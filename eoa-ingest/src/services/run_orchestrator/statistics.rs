//! Run statistics tracking
//!
//! Per-page tallies produced by reconciliation and their run-level totals.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{RunSummary, YearSummary};

/// **Page Statistics**
///
/// Display: "N new, M updated, S skipped, E errors"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageStats {
    /// Records inserted
    pub new: usize,
    /// Records overwritten
    pub updated: usize,
    /// Documents without any identifier
    pub skipped: usize,
    /// Documents that failed to decode, validate or store
    pub errors: usize,
}

impl PageStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} new, {} updated, {} skipped, {} errors",
            self.new, self.updated, self.skipped, self.errors
        )
    }
}

/// **Run Statistics**
///
/// Running totals across every committed page of a run. A page-level
/// failure counts as one error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStatistics {
    pub pages_completed: u32,
    pub new: u64,
    pub updated: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl RunStatistics {
    pub fn add_page(&mut self, stats: &PageStats) {
        self.pages_completed += 1;
        self.new += stats.new as u64;
        self.updated += stats.updated as u64;
        self.skipped += stats.skipped as u64;
        self.errors += stats.errors as u64;
    }

    pub fn record_page_failure(&mut self) {
        self.errors += 1;
    }

    pub fn total(&self) -> u64 {
        self.new + self.updated
    }

    pub fn display_string(&self) -> String {
        format!(
            "{} pages, {} new, {} updated, {} skipped, {} errors",
            self.pages_completed, self.new, self.updated, self.skipped, self.errors
        )
    }

    pub fn to_run_summary(&self) -> RunSummary {
        RunSummary {
            new_records: self.new,
            updated_records: self.updated,
            skipped_records: self.skipped,
            errors: self.errors,
            completed_at: Utc::now(),
        }
    }

    pub fn to_year_summary(&self, year: i32) -> YearSummary {
        YearSummary {
            year,
            new_records: self.new,
            updated_records: self.updated,
            total_records: self.total(),
            errors: self.errors,
            completed_at: Utc::now(),
        }
    }
}
