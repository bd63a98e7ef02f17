//! Run-level retry policy
//!
//! Replaces task-queue retries: a run that fails at page level is
//! re-invoked after a fixed delay, up to `max_retries` times.

use eoa_common::config::IngestConfig;
use std::future::Future;
use std::time::Duration;

use super::RunError;

#[derive(Debug, Clone)]
pub struct RunRetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RunRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(300),
        }
    }
}

impl From<&IngestConfig> for RunRetryPolicy {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_retries: config.run_max_retries,
            delay: Duration::from_secs(config.run_retry_delay_secs),
        }
    }
}

impl RunRetryPolicy {
    /// Invoke `run` until it succeeds, fails with a non-retryable error, or
    /// the retry budget is spent
    pub async fn run<F, Fut, T>(&self, run_name: &str, mut run: F) -> Result<T, RunError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RunError>>,
    {
        let mut retries = 0;

        loop {
            match run().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retries < self.max_retries => {
                    retries += 1;
                    tracing::warn!(
                        run = run_name,
                        retry = retries,
                        max_retries = self.max_retries,
                        delay_secs = self.delay.as_secs(),
                        error = %e,
                        "Run failed, retrying after delay"
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => {
                    tracing::error!(run = run_name, retries, error = %e, "Run failed");
                    return Err(e);
                }
            }
        }
    }
}
