//! eoa-ingest library - Executive orders ingestion and read API
//!
//! Ingestion pipeline (Federal Register client, normalizer, reconciler,
//! progress tracker, run orchestrator, scheduler) plus the read-only HTTP
//! API over the archive.

use axum::Router;
use sqlx::SqlitePool;
use std::time::Instant;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod models;
pub mod pagination;
pub mod services;
pub mod utils;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Archive database pool
    pub db: SqlitePool,
    /// Server start, for uptime reporting
    pub startup_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api::executive_order_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
