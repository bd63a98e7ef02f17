//! Data models for the ingest pipeline

pub mod fetch_progress;
pub mod run_summary;
pub mod source_document;

pub use fetch_progress::FetchProgress;
pub use run_summary::{BackfillSummary, RunSummary, YearSummary};
pub use source_document::{PageResult, SourceDocument, SourceFilters};
