//! Database access for the archive
//!
//! SQLite keyed record store: one `executive_orders` table keyed by the
//! canonical order id.

pub mod executive_orders;
pub mod models;

use crate::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Creates the database file (and parent folder) if missing, then ensures
/// the schema exists.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create archive tables and indexes if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS executive_orders (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            issuance_date TEXT NOT NULL,
            issuing_authority TEXT NOT NULL,
            citation TEXT,
            source_url TEXT,
            summary TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_executive_orders_issuance_date ON executive_orders(issuance_date)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_executive_orders_authority ON executive_orders(issuing_authority)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (executive_orders)");

    Ok(())
}
