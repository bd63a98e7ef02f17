//! Recurring update scheduler
//!
//! Runs the incremental update on a fixed interval under the run-level
//! retry policy, until the cancellation token fires. The first update runs
//! immediately on start.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::run_orchestrator::{RunOrchestrator, RunRetryPolicy};
use eoa_common::config::IngestConfig;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between update runs (default: 24h)
    pub interval: Duration,
    /// Look-back window of each update (default: 30 days)
    pub days_back: u32,
    pub retry: RunRetryPolicy,
}

impl From<&IngestConfig> for SchedulerConfig {
    fn from(config: &IngestConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.update_interval_hours * 3600),
            days_back: config.update_days_back,
            retry: RunRetryPolicy::from(config),
        }
    }
}

pub struct UpdateScheduler {
    orchestrator: Arc<RunOrchestrator>,
    config: SchedulerConfig,
}

impl UpdateScheduler {
    pub fn new(orchestrator: Arc<RunOrchestrator>, config: SchedulerConfig) -> Self {
        Self {
            orchestrator,
            config,
        }
    }

    /// Run until `cancel_token` is cancelled
    ///
    /// Cancellation is observed between runs; an update in progress
    /// finishes first.
    pub async fn run(self, cancel_token: CancellationToken) {
        info!(
            "Starting UpdateScheduler (interval: {}s, days_back: {})",
            self.config.interval.as_secs(),
            self.config.days_back
        );

        // interval() panics on a zero period
        let mut timer = interval(self.config.interval.max(Duration::from_millis(1)));
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    info!("UpdateScheduler stopped");
                    break;
                }
                _ = timer.tick() => {
                    let days_back = self.config.days_back;
                    let result = self
                        .config
                        .retry
                        .run("incremental update", || self.orchestrator.run_incremental_update(days_back))
                        .await;

                    match result {
                        Ok(summary) => info!(
                            new = summary.new_records,
                            updated = summary.updated_records,
                            errors = summary.errors,
                            "Scheduled update completed"
                        ),
                        Err(e) => error!(error = %e, "Scheduled update failed"),
                    }
                }
            }
        }
    }

    /// Spawn the scheduler as a background task
    pub fn spawn(self, cancel_token: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run(cancel_token))
    }
}
