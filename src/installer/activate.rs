//! Post-extraction activation on unix hosts.
//!
//! Marks the versioned binary executable and points the stable `stattrack`
//! alias at it. Every step here is best-effort: failures are logged and the
//! install still counts as successful.

use std::path::Path;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::constants::EXECUTABLE_MODE;
use crate::utils::fs::set_mode;

/// Make `binary` executable and create the alias at `alias`.
///
/// An alias that already is a symlink is left alone. Otherwise a relative
/// symlink is created; if that fails the binary is copied to the alias path.
pub async fn activate(binary: &Path, alias: &Path) {
    match set_mode(binary, EXECUTABLE_MODE).await {
        Ok(()) => debug!("Set executable permissions on {}", binary.display()),
        Err(e) => warn!("Failed to set executable permissions: {}", e),
    }

    if is_symlink(alias).await {
        debug!("Alias {} already exists", alias.display());
        return;
    }

    let target = binary.file_name().unwrap_or(binary.as_os_str());
    match fs::symlink(target, alias).await {
        Ok(()) => info!("Linked {} -> {}", alias.display(), Path::new(target).display()),
        Err(e) => {
            warn!("Failed to create symlink {}: {}, copying instead", alias.display(), e);
            copy_alias(binary, alias).await;
        }
    }
}

async fn copy_alias(binary: &Path, alias: &Path) {
    if let Err(e) = fs::copy(binary, alias).await {
        warn!("Failed to copy {} to {}: {}", binary.display(), alias.display(), e);
        return;
    }
    match set_mode(alias, EXECUTABLE_MODE).await {
        Ok(()) => debug!("Copied {} to {}", binary.display(), alias.display()),
        Err(e) => warn!("Failed to set executable permissions on alias: {}", e),
    }
}

async fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .await
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn mode(path: &Path) -> u32 {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[tokio::test]
    async fn test_creates_relative_symlink_and_sets_mode() {
        let temp = TempDir::new().unwrap();
        let binary = temp.path().join("stattrack-linux-amd64");
        let alias = temp.path().join("stattrack");
        std::fs::write(&binary, b"bin").unwrap();
        std::fs::set_permissions(&binary, std::fs::Permissions::from_mode(0o644)).unwrap();

        activate(&binary, &alias).await;

        assert_eq!(mode(&binary), 0o755);
        assert_eq!(std::fs::read_link(&alias).unwrap(), Path::new("stattrack-linux-amd64"));
        assert_eq!(std::fs::read(&alias).unwrap(), b"bin");
    }

    #[tokio::test]
    async fn test_existing_symlink_is_kept() {
        let temp = TempDir::new().unwrap();
        let binary = temp.path().join("stattrack-linux-amd64");
        let alias = temp.path().join("stattrack");
        std::fs::write(&binary, b"bin").unwrap();
        std::os::unix::fs::symlink("elsewhere", &alias).unwrap();

        activate(&binary, &alias).await;

        assert_eq!(std::fs::read_link(&alias).unwrap(), Path::new("elsewhere"));
    }

    #[tokio::test]
    async fn test_regular_file_alias_is_replaced_by_copy() {
        let temp = TempDir::new().unwrap();
        let binary = temp.path().join("stattrack-linux-amd64");
        let alias = temp.path().join("stattrack");
        std::fs::write(&binary, b"new").unwrap();
        std::fs::write(&alias, b"old copy").unwrap();

        activate(&binary, &alias).await;

        assert!(!std::fs::symlink_metadata(&alias).unwrap().file_type().is_symlink());
        assert_eq!(std::fs::read(&alias).unwrap(), b"new");
        assert_eq!(mode(&alias), 0o755);
    }

    #[tokio::test]
    async fn test_missing_binary_does_not_panic() {
        let temp = TempDir::new().unwrap();
        activate(&temp.path().join("absent"), &temp.path().join("stattrack")).await;
    }
}
