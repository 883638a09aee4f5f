//! File system helpers for the managed resources directory.
//!
//! Functions returning [`Result`] are used by critical install steps and
//! propagate [`StattrackError::FilesystemError`]. The `*_best_effort` helpers
//! log failures at warn level and never fail.

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::core::{Result, StattrackError};

/// Create `path` and its parents if missing.
pub async fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| StattrackError::filesystem("create directory", path, e))
}

/// Remove a file, treating "not found" as success.
///
/// Returns whether a file was removed.
pub async fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Remove a file, logging any failure other than "not found".
pub async fn remove_file_best_effort(path: &Path) {
    match remove_file_if_exists(path).await {
        Ok(true) => debug!("Removed {}", path.display()),
        Ok(false) => {}
        Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
    }
}

/// Files directly inside `dir` whose names start with `prefix` and end with
/// `suffix`.
pub async fn find_matching(dir: &Path, prefix: &str, suffix: &str) -> io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut matches = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(prefix) && name.ends_with(suffix) && entry.file_type().await?.is_file() {
            matches.push(entry.path());
        }
    }
    matches.sort();
    Ok(matches)
}

/// Remove every file matched by [`find_matching`], returning how many went.
pub async fn remove_matching_best_effort(dir: &Path, prefix: &str, suffix: &str) -> usize {
    let matches = match find_matching(dir, prefix, suffix).await {
        Ok(matches) => matches,
        Err(e) => {
            warn!("Failed to scan {} for stale files: {}", dir.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for path in matches {
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed stale file {}", path.display());
                removed += 1;
            }
            Err(e) => warn!("Failed to remove stale file {}: {}", path.display(), e),
        }
    }
    removed
}

/// Set unix permission bits on `path`.
#[cfg(unix)]
pub async fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .await
        .map_err(|e| StattrackError::filesystem("chmod", path, e))
}
