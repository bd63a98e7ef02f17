//! Progress tracker
//!
//! Persists the single [`FetchProgress`] slot of a resumable run as a JSON
//! file. Each save overwrites the slot wholesale through write-then-rename,
//! so an interrupted save never leaves a truncated checkpoint behind.

use eoa_common::{Error, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::models::FetchProgress;

/// File-backed checkpoint store
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    path: PathBuf,
}

impl ProgressTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist or overwrite the checkpoint
    pub async fn save(&self, progress: &FetchProgress) -> Result<()> {
        let json = serde_json::to_vec_pretty(progress)
            .map_err(|e| Error::Internal(format!("Failed to serialize progress: {}", e)))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            current_page = progress.current_page,
            total_pages = progress.total_pages,
            "Saved fetch state"
        );
        Ok(())
    }

    /// Load the checkpoint, if any
    ///
    /// A missing file means a fresh run. An unreadable checkpoint is logged
    /// and treated the same way.
    pub async fn load(&self) -> Result<Option<FetchProgress>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice::<FetchProgress>(&bytes) {
            Ok(progress) => {
                tracing::info!(
                    path = %self.path.display(),
                    current_page = progress.current_page,
                    total_pages = progress.total_pages,
                    "Loaded fetch state"
                );
                Ok(Some(progress))
            }
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "Error loading state file");
                Ok(None)
            }
        }
    }
}
