//! Rename-based backup of the installed binary.
//!
//! Before an archive is extracted over the resources directory the current
//! versioned binary is moved aside to `<binary>.backup`. A failed extraction
//! moves it back, so the previous binary survives byte-for-byte; a successful
//! install deletes it.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::constants::BACKUP_SUFFIX;
use crate::core::{Result, StattrackError};
use crate::utils::fs::{remove_file_best_effort, remove_file_if_exists};

/// Backup slot for one binary.
#[derive(Debug, Clone)]
pub struct BinaryBackup {
    original_path: PathBuf,
    backup_path: PathBuf,
}

impl BinaryBackup {
    /// Backup slot next to `binary_path`, named `<file name>.backup`.
    pub fn new(binary_path: impl Into<PathBuf>) -> Self {
        let original_path = binary_path.into();
        let mut backup_path = original_path.clone();
        backup_path.set_file_name(format!(
            "{}{}",
            original_path.file_name().unwrap_or_default().to_string_lossy(),
            BACKUP_SUFFIX
        ));

        Self {
            original_path,
            backup_path,
        }
    }

    /// Move the binary into the backup slot.
    ///
    /// Returns `false` without touching anything when there is no binary.
    /// A leftover backup from an earlier run is replaced.
    pub async fn create(&self) -> Result<bool> {
        if fs::symlink_metadata(&self.original_path).await.is_err() {
            debug!("No binary at {}, nothing to back up", self.original_path.display());
            return Ok(false);
        }

        remove_file_if_exists(&self.backup_path)
            .await
            .map_err(|e| StattrackError::filesystem("remove old backup", &self.backup_path, e))?;

        fs::rename(&self.original_path, &self.backup_path)
            .await
            .map_err(|e| StattrackError::filesystem("back up binary", &self.original_path, e))?;
        debug!("Backed up {} to {}", self.original_path.display(), self.backup_path.display());
        Ok(true)
    }

    /// Move the backup over whatever is at the original path.
    ///
    /// Returns `false` when there is no backup to restore.
    pub async fn restore(&self) -> Result<bool> {
        if !self.exists().await {
            debug!("No backup at {}, nothing to restore", self.backup_path.display());
            return Ok(false);
        }

        warn!("Restoring previous binary from {}", self.backup_path.display());
        remove_file_if_exists(&self.original_path)
            .await
            .map_err(|e| StattrackError::filesystem("remove partial binary", &self.original_path, e))?;
        fs::rename(&self.backup_path, &self.original_path)
            .await
            .map_err(|e| StattrackError::filesystem("restore backup", &self.backup_path, e))?;
        info!("Restored {}", self.original_path.display());
        Ok(true)
    }

    /// Delete the backup, logging failures.
    pub async fn discard(&self) {
        remove_file_best_effort(&self.backup_path).await;
    }

    pub async fn exists(&self) -> bool {
        fs::symlink_metadata(&self.backup_path).await.is_ok()
    }

    pub fn original_path(&self) -> &Path {
        &self.original_path
    }

    pub fn backup_path(&self) -> &Path {
        &self.backup_path
    }
}
