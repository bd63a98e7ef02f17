//! Run orchestrator
//!
//! Drives paginated ingestion runs against a [`DocumentSource`]:
//!
//! FetchPage → ProcessPage → Checkpoint → Advance, looping while
//! `current_page <= total_pages` and the optional `max_pages` bound allows.
//!
//! Pages are fetched and reconciled strictly sequentially. A page that fails
//! to fetch or commit is checkpointed with `last_error`, followed by a fixed
//! pause, and surfaced as [`RunError::Page`]. What happens next depends on
//! the driver:
//!
//! - **Incremental / per-year runs** return the error so the caller's
//!   [`RunRetryPolicy`] can re-invoke the run.
//! - **Manual fetch** stops early and reports the partial total; the
//!   on-disk checkpoint lets `--resume` pick up at the failed page.
//!
//! Each run kind lives in its own module as an `impl RunOrchestrator` block.

use eoa_common::config::IngestConfig;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::federal_register_client::{DocumentSource, FRError};
use super::progress_tracker::ProgressTracker;
use super::reconciler::Reconciler;
use crate::models::{FetchProgress, SourceFilters};

mod backfill;
mod incremental;
mod manual_fetch;
pub mod retry;
pub mod statistics;

pub use manual_fetch::ManualFetchRequest;
pub use retry::RunRetryPolicy;
pub use statistics::{PageStats, RunStatistics};

/// Failure of a single page: fetch or commit
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Fetch(#[from] FRError),

    #[error(transparent)]
    Store(#[from] eoa_common::Error),
}

/// Run-level errors surfaced to the orchestration driver
#[derive(Debug, Error)]
pub enum RunError {
    /// Page-level fatal error; the checkpoint still points at `page`
    #[error("Page {page} failed: {source}")]
    Page {
        page: u32,
        #[source]
        source: PageError,
    },

    /// Progress could not be persisted
    #[error("Checkpoint failed: {0}")]
    Checkpoint(#[source] eoa_common::Error),

    #[error("Invalid run parameters: {0}")]
    InvalidInput(String),
}

impl RunError {
    /// Whether re-invoking the whole run can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, RunError::Page { .. } | RunError::Checkpoint(_))
    }
}

/// Orchestrator tuning, usually derived from `[ingest]` config
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Page size for incremental and backfill runs
    pub page_size: u32,
    /// Default page size for manual fetch runs
    pub manual_page_size: u32,
    /// Pause between pages of a manual fetch
    pub page_delay: Duration,
    /// Pause after a page-level failure
    pub page_failure_delay: Duration,
    pub backfill_start_year: i32,
    pub max_lock_wait_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

impl From<&IngestConfig> for OrchestratorConfig {
    fn from(config: &IngestConfig) -> Self {
        Self {
            page_size: config.page_size,
            manual_page_size: config.manual_page_size,
            page_delay: Duration::from_millis(config.page_delay_ms),
            page_failure_delay: Duration::from_millis(config.page_failure_delay_ms),
            backfill_start_year: config.backfill_start_year,
            max_lock_wait_ms: config.max_lock_wait_ms,
        }
    }
}

/// Parameters of one pass over the page loop
struct PageLoop<'a> {
    filters: SourceFilters,
    page_size: u32,
    /// Absolute page-number bound
    max_pages: Option<u32>,
    page_delay: Duration,
    /// Checkpoint store; in-memory only when `None`
    tracker: Option<&'a ProgressTracker>,
}

/// Run orchestrator service
pub struct RunOrchestrator {
    source: Arc<dyn DocumentSource>,
    reconciler: Reconciler,
    config: OrchestratorConfig,
}

impl RunOrchestrator {
    /// Create new run orchestrator
    ///
    /// # Arguments
    /// * `db` - Archive database pool
    /// * `source` - Paginated document source (the Federal Register client in production)
    /// * `config` - Page sizes, delays and lock-retry budget
    pub fn new(db: SqlitePool, source: Arc<dyn DocumentSource>, config: OrchestratorConfig) -> Self {
        let reconciler = Reconciler::new(db, config.max_lock_wait_ms);
        Self {
            source,
            reconciler,
            config,
        }
    }

    /// FetchPage + ProcessPage
    async fn process_page(
        &self,
        filters: &SourceFilters,
        page: u32,
        page_size: u32,
    ) -> Result<(Option<u32>, PageStats), PageError> {
        let result = self.source.fetch_page(filters, page, page_size).await?;
        let stats = self.reconciler.reconcile_page(&result.results).await?;
        Ok((result.total_pages, stats))
    }

    /// Page loop shared by every run kind
    ///
    /// Starts at `progress.current_page` and folds every committed page into
    /// both `progress` and `stats`.
    async fn run_pages(
        &self,
        run: &PageLoop<'_>,
        progress: &mut FetchProgress,
        stats: &mut RunStatistics,
    ) -> Result<(), RunError> {
        while progress.has_next() {
            if let Some(max_pages) = run.max_pages {
                if progress.current_page > max_pages {
                    tracing::info!(max_pages, "Reached max pages limit");
                    break;
                }
            }

            let page = progress.current_page;
            tracing::info!(page, total_pages = progress.total_pages, "Fetching page");

            match self.process_page(&run.filters, page, run.page_size).await {
                Ok((total_pages, page_stats)) => {
                    if let Some(total_pages) = total_pages {
                        progress.total_pages = total_pages;
                    }
                    progress.record_page(&page_stats);
                    stats.add_page(&page_stats);

                    tracing::info!(page, "Page {} processed: {}", page, page_stats.display_string());

                    self.checkpoint(run.tracker, progress).await?;

                    if progress.has_next() && !run.page_delay.is_zero() {
                        tokio::time::sleep(run.page_delay).await;
                    }
                }
                Err(e) => {
                    tracing::error!(page, error = %e, "Error processing page");

                    progress.record_failure(e.to_string());
                    stats.record_page_failure();
                    // The page error is what the caller acts on
                    if let Err(checkpoint_err) = self.checkpoint(run.tracker, progress).await {
                        tracing::error!(
                            page,
                            error = %checkpoint_err,
                            "Checkpoint after failed page {} could not be saved",
                            page
                        );
                    }

                    if !self.config.page_failure_delay.is_zero() {
                        tokio::time::sleep(self.config.page_failure_delay).await;
                    }
                    return Err(RunError::Page { page, source: e });
                }
            }
        }

        Ok(())
    }

    async fn checkpoint(
        &self,
        tracker: Option<&ProgressTracker>,
        progress: &mut FetchProgress,
    ) -> Result<(), RunError> {
        progress.last_updated = Some(chrono::Utc::now());
        if let Some(tracker) = tracker {
            tracker.save(progress).await.map_err(RunError::Checkpoint)?;
        }
        Ok(())
    }
}
