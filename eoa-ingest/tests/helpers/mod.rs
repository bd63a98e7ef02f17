//! Test Helper Utilities
//!
//! Shared utilities for testing eoa-ingest

#![allow(dead_code)]

pub mod db_utils;
pub mod log_capture;
pub mod mock_source;

// Re-export commonly used items
pub use db_utils::{create_test_db, create_test_orchestrator, document, test_orchestrator_config};
pub use log_capture::{capture_logs, LogCapture};
pub use mock_source::ScriptedSource;
