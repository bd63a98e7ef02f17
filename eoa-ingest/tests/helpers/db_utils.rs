//! Database Test Utilities

use anyhow::Result;
use eoa_ingest::services::{DocumentSource, OrchestratorConfig, RunOrchestrator};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Create temporary test database with the archive schema
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_eoa.db");

    let pool = eoa_common::db::init_database_pool(&db_path).await?;

    Ok((temp_dir, pool))
}

/// Orchestrator settings with every pause disabled
pub fn test_orchestrator_config() -> OrchestratorConfig {
    OrchestratorConfig {
        page_size: 50,
        manual_page_size: 20,
        page_delay: Duration::ZERO,
        page_failure_delay: Duration::ZERO,
        backfill_start_year: 1994,
        max_lock_wait_ms: 1000,
    }
}

/// Create test RunOrchestrator over a scripted source
pub fn create_test_orchestrator<S>(db_pool: SqlitePool, source: Arc<S>) -> RunOrchestrator
where
    S: DocumentSource + 'static,
{
    RunOrchestrator::new(db_pool, source, test_orchestrator_config())
}

/// Raw Federal Register document with a structured order number
pub fn document(number: &str, title: &str, signing_date: &str) -> Value {
    json!({
        "executive_order_number": number,
        "document_number": format!("2021-{}", number),
        "title": title,
        "signing_date": signing_date,
        "publication_date": signing_date,
        "president": {"identifier": "joseph-biden", "name": "Joseph R. Biden Jr."},
        "citation": format!("86 FR {}", number),
        "html_url": format!("https://www.federalregister.gov/d/2021-{}", number)
    })
}
