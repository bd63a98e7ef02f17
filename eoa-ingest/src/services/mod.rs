//! Service modules for executive order ingestion
//!
//! Source client → normalizer → reconciler, driven page by page by the run
//! orchestrator, with checkpoints persisted by the progress tracker.

pub mod federal_register_client;
pub mod normalizer;
pub mod progress_tracker;
pub mod reconciler;
pub mod run_orchestrator;
pub mod scheduler;

pub use federal_register_client::{
    ClientConfig, DocumentSource, FRError, FederalRegisterClient, RetryPolicy,
};
pub use progress_tracker::ProgressTracker;
pub use reconciler::{ReconcileOutcome, Reconciler};
pub use run_orchestrator::{
    ManualFetchRequest, OrchestratorConfig, PageError, PageStats, RunError, RunOrchestrator,
    RunRetryPolicy, RunStatistics,
};
pub use scheduler::{SchedulerConfig, UpdateScheduler};
