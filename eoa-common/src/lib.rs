//! # Executive Orders Archive - Common Library
//!
//! Shared code for the archive's ingest service and read API:
//! - Error type
//! - Bootstrap configuration loading and data folder resolution
//! - SQLite pool initialisation, record models and keyed store queries

pub mod config;
pub mod db;
pub mod error;

pub use db::models::{CanonicalRecord, StoredRecord};
pub use error::{Error, Result};
