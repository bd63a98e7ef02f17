//! Record reconciler
//!
//! Upserts normalized records into the archive. A page is one transaction;
//! each document runs inside its own savepoint so a failing document rolls
//! back alone while the rest of the page commits.

use eoa_common::db::executive_orders;
use eoa_common::{CanonicalRecord, Error, Result};
use serde_json::Value;
use sqlx::{Connection, SqliteConnection, SqlitePool};

use super::normalizer;
use super::run_orchestrator::statistics::PageStats;
use crate::utils::retry_on_lock;

/// Outcome of reconciling one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Created,
    Updated,
}

enum DocumentOutcome {
    Reconciled(ReconcileOutcome),
    Skipped,
}

/// Insert the record if its id is unknown, otherwise overwrite it
///
/// Runs on whatever connection or transaction the caller holds.
pub async fn reconcile(
    conn: &mut SqliteConnection,
    record: &CanonicalRecord,
) -> Result<ReconcileOutcome> {
    executive_orders::validate_record(record)?;

    match executive_orders::get_by_id(&mut *conn, &record.id).await? {
        Some(_) => {
            executive_orders::update(&mut *conn, record).await?;
            tracing::info!(order = %record.id, "Updated executive order");
            Ok(ReconcileOutcome::Updated)
        }
        None => {
            executive_orders::insert(&mut *conn, record).await?;
            tracing::info!(order = %record.id, "Added new executive order");
            Ok(ReconcileOutcome::Created)
        }
    }
}

/// Page-level reconciliation against the archive pool
#[derive(Clone)]
pub struct Reconciler {
    db: SqlitePool,
    max_lock_wait_ms: u64,
}

impl Reconciler {
    pub fn new(db: SqlitePool, max_lock_wait_ms: u64) -> Self {
        Self {
            db,
            max_lock_wait_ms,
        }
    }

    /// Reconcile a single record in its own transaction
    pub async fn reconcile_record(&self, record: &CanonicalRecord) -> Result<ReconcileOutcome> {
        retry_on_lock("reconcile record", self.max_lock_wait_ms, || async move {
            let mut tx = self.db.begin().await?;
            let outcome = reconcile(&mut tx, record).await?;
            tx.commit().await?;
            Ok(outcome)
        })
        .await
    }

    /// Normalize and reconcile every raw document of a page
    ///
    /// Document-level failures are counted and never abort the page. Only
    /// failures of the page transaction itself are returned; on lock
    /// contention the whole page is re-run from scratch.
    pub async fn reconcile_page(&self, documents: &[Value]) -> Result<PageStats> {
        retry_on_lock("reconcile page", self.max_lock_wait_ms, || async move {
            let mut tx = self.db.begin().await?;
            let mut stats = PageStats::default();

            for raw in documents {
                match Self::process_document(&mut tx, raw).await {
                    Ok(DocumentOutcome::Reconciled(ReconcileOutcome::Created)) => stats.new += 1,
                    Ok(DocumentOutcome::Reconciled(ReconcileOutcome::Updated)) => {
                        stats.updated += 1
                    }
                    Ok(DocumentOutcome::Skipped) => stats.skipped += 1,
                    Err(e) if e.is_database_locked() => return Err(e),
                    Err(e) => {
                        tracing::error!(
                            document = document_label(raw),
                            error = %e,
                            "Error processing document"
                        );
                        stats.errors += 1;
                    }
                }
            }

            tx.commit().await?;
            Ok(stats)
        })
        .await
    }

    async fn process_document(conn: &mut SqliteConnection, raw: &Value) -> Result<DocumentOutcome> {
        let Some(record) = normalizer::decode_and_normalize(raw)
            .map_err(|e| Error::InvalidInput(format!("Undecodable document: {}", e)))?
        else {
            return Ok(DocumentOutcome::Skipped);
        };

        // Savepoint: rolled back on drop if reconcile fails
        let mut savepoint = conn.begin().await?;
        let outcome = reconcile(&mut savepoint, &record).await?;
        savepoint.commit().await?;

        Ok(DocumentOutcome::Reconciled(outcome))
    }
}

fn document_label(raw: &Value) -> &str {
    raw.get("document_number")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    // One connection: every in-memory connection is its own database
    async fn test_pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        eoa_common::db::init_tables(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_reconcile_record_creates_then_updates() {
        let pool = test_pool().await;
        let reconciler = Reconciler::new(pool.clone(), 1000);
        let mut record = CanonicalRecord {
            id: "EO-14001".to_string(),
            title: "Original".to_string(),
            issuance_date: NaiveDate::from_ymd_opt(2021, 1, 21).unwrap(),
            issuing_authority: "Joseph R. Biden Jr.".to_string(),
            citation: None,
            source_url: None,
            summary: None,
        };

        assert_eq!(
            reconciler.reconcile_record(&record).await.unwrap(),
            ReconcileOutcome::Created
        );

        record.title = "Revised".to_string();
        assert_eq!(
            reconciler.reconcile_record(&record).await.unwrap(),
            ReconcileOutcome::Updated
        );

        let stored = executive_orders::get_by_id(&pool, "EO-14001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "Revised");
    }

    #[tokio::test]
    async fn test_failing_document_does_not_abort_page() {
        let pool = test_pool().await;
        let reconciler = Reconciler::new(pool.clone(), 1000);
        let documents = vec![
            json!({"executive_order_number": "14002", "title": "Kept", "signing_date": "2021-01-22"}),
            json!({"executive_order_number": "14003", "title": "", "signing_date": "2021-01-22"}),
            json!({"title": "No identifier"}),
            json!(42),
            json!({"executive_order_number": "14004", "title": "Also kept", "signing_date": "2021-01-22"}),
        ];

        let stats = reconciler.reconcile_page(&documents).await.unwrap();

        assert_eq!(
            stats,
            PageStats {
                new: 2,
                updated: 0,
                skipped: 1,
                errors: 2,
            }
        );
        assert_eq!(executive_orders::count(&pool).await.unwrap(), 2);
        assert!(executive_orders::get_by_id(&pool, "EO-14003")
            .await
            .unwrap()
            .is_none());
    }
}
