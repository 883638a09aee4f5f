//! Download and installation of the CLI into the resources directory.
//!
//! # Pipeline
//!
//! 1. Remove `stattrack*.zip` leftovers from earlier interrupted runs
//! 2. Download the release archive to a uniquely named temp file
//! 3. Move the current versioned binary aside to `<binary>.backup`
//! 4. Extract the archive over the resources directory
//! 5. On unix: drop the backup, mark the binary executable, create the
//!    `stattrack` alias
//! 6. Delete the archive
//!
//! Only the download (2) and the extraction (4) can fail the install. A
//! failed extraction deletes the archive and puts the backup back in place,
//! so the previously installed binary keeps working. Every other step logs
//! its failure and carries on.

#[cfg(unix)]
mod activate;
mod backup;
mod download;
mod extract;

pub use backup::BinaryBackup;
pub use download::{ArchiveFetcher, HttpFetcher};
pub use extract::extract_zip;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::constants::ARCHIVE_EXTENSION;
use crate::core::{Result, StattrackError};
use crate::locator::BinaryLocator;
use crate::release::ReleaseResolver;
use crate::utils::fs::{remove_file_best_effort, remove_matching_best_effort};
use crate::utils::progress::ProgressObserver;

/// Runs the install pipeline for one host.
pub struct Installer {
    locator: Arc<BinaryLocator>,
    resolver: Arc<ReleaseResolver>,
    fetcher: Arc<dyn ArchiveFetcher>,
}

impl Installer {
    pub fn new(
        locator: Arc<BinaryLocator>,
        resolver: Arc<ReleaseResolver>,
        fetcher: Arc<dyn ArchiveFetcher>,
    ) -> Self {
        Self {
            locator,
            resolver,
            fetcher,
        }
    }

    /// Fresh temp archive path, `<resources>/stattrack-<uuid>.zip`.
    pub fn temp_archive_path(&self) -> PathBuf {
        self.locator.resources_dir().join(format!(
            "{}-{}{}",
            self.locator.binary_name(),
            uuid::Uuid::new_v4().simple(),
            ARCHIVE_EXTENSION
        ))
    }

    /// Download and install the release for this host.
    ///
    /// Returns the path of the installed versioned binary.
    ///
    /// # Errors
    ///
    /// Fails when the download or the extraction fails. In both cases the
    /// temp archive is gone afterwards, and after an extraction failure the
    /// previous binary has been restored.
    pub async fn install(&self, observer: &dyn ProgressObserver) -> Result<PathBuf> {
        let resources = self.locator.resources_dir();
        self.remove_stale_archives(resources).await;

        let url = self.resolver.download_url(self.locator.signature());
        let archive = self.temp_archive_path();
        debug!("Temporary archive: {}", archive.display());

        if let Err(e) = self.fetcher.fetch(&url, &archive, observer).await {
            remove_file_best_effort(&archive).await;
            return Err(e);
        }
        info!("Downloaded {}", url);

        let binary = self.locator.local_path();
        let backup = BinaryBackup::new(&binary);
        if let Err(e) = backup.create().await {
            warn!("Failed to back up current binary: {}", e);
        }

        if let Err(e) = extract_blocking(&archive, resources).await {
            warn!("Failed to extract {}: {}", archive.display(), e);
            remove_file_best_effort(&archive).await;
            match backup.restore().await {
                Ok(true) => {}
                Ok(false) => remove_file_best_effort(&binary).await,
                Err(restore_err) => warn!("Failed to restore previous binary: {}", restore_err),
            }
            return Err(e);
        }
        info!("Extracted stattrack to {}", resources.display());

        #[cfg(unix)]
        {
            backup.discard().await;
            activate::activate(&binary, &self.locator.alias_path()).await;
        }

        remove_file_best_effort(&archive).await;
        info!("Installed stattrack at {}", binary.display());
        Ok(binary)
    }

    async fn remove_stale_archives(&self, resources: &Path) {
        let removed =
            remove_matching_best_effort(resources, self.locator.binary_name(), ARCHIVE_EXTENSION)
                .await;
        if removed > 0 {
            debug!("Removed {} stale archive(s) from {}", removed, resources.display());
        }
    }
}

async fn extract_blocking(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let archive_path = archive.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || extract_zip(&archive_path, &dest))
        .await
        .map_err(|e| StattrackError::ArchiveError {
            path: archive.to_path_buf(),
            reason: format!("extraction task failed: {e}"),
        })?
}
