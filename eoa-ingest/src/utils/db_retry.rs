//! SQLite lock retry
//!
//! Exponential backoff for SQLite lock contention. Two runs over overlapping
//! windows can contend for the write lock; a page's unit of work is re-run
//! until `ingest.max_lock_wait_ms` elapses.

use eoa_common::{Error, Result};
use std::time::{Duration, Instant};

const INITIAL_BACKOFF_MS: u64 = 10;
const MAX_BACKOFF_MS: u64 = 1000;

/// Re-run `operation` while it fails with a lock error, for at most `max_wait_ms`
///
/// Each attempt must open its own transaction. Other errors return at once;
/// running out of time turns the lock error into `Error::Internal`.
pub async fn retry_on_lock<F, Fut, T>(
    operation_name: &str,
    max_wait_ms: u64,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let deadline = Instant::now() + Duration::from_millis(max_wait_ms);
    let mut attempts: u32 = 0;
    let mut backoff_ms = INITIAL_BACKOFF_MS;

    loop {
        attempts += 1;
        let err = match operation().await {
            Ok(result) => return Ok(result),
            Err(err) if err.is_database_locked() => err,
            Err(err) => return Err(err),
        };

        if Instant::now() >= deadline {
            tracing::error!(
                operation = operation_name,
                attempts,
                max_wait_ms,
                "Database still locked, giving up"
            );
            return Err(Error::Internal(format!(
                "Database locked after {} attempts during {} (max {} ms): {}",
                attempts, operation_name, max_wait_ms, err
            )));
        }

        tracing::warn!(operation = operation_name, attempts, backoff_ms, "Database locked, backing off");
        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
    }
}
