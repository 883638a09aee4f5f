//! Zip extraction into the resources directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::{Result, StattrackError};

/// Extract every entry of `archive` under `dest`, overwriting existing files.
///
/// Entries whose names would escape `dest` abort the extraction. Unix
/// permission bits stored in the archive are applied. Returns the extracted
/// file paths in archive order.
///
/// On failure every file written so far, including a partially written one,
/// is removed again.
///
/// This is blocking I/O; async callers run it on the blocking pool.
pub fn extract_zip(archive: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    let file = fs::File::open(archive)
        .map_err(|e| StattrackError::filesystem("open archive", archive, e))?;
    let mut zip = zip::ZipArchive::new(file).map_err(|e| archive_error(archive, e.to_string()))?;

    let mut extracted = Vec::new();
    if let Err(e) = extract_entries(&mut zip, archive, dest, &mut extracted) {
        for path in &extracted {
            if let Err(remove_err) = fs::remove_file(path) {
                if remove_err.kind() != io::ErrorKind::NotFound {
                    warn!("Failed to remove partially extracted {}: {}", path.display(), remove_err);
                }
            }
        }
        return Err(e);
    }

    Ok(extracted)
}

fn extract_entries(
    zip: &mut zip::ZipArchive<fs::File>,
    archive: &Path,
    dest: &Path,
    extracted: &mut Vec<PathBuf>,
) -> Result<()> {
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|e| archive_error(archive, e.to_string()))?;
        let Some(relative) = entry.enclosed_name() else {
            return Err(archive_error(archive, format!("unsafe entry name '{}'", entry.name())));
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .map_err(|e| StattrackError::filesystem("create directory", &out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StattrackError::filesystem("create directory", parent, e))?;
        }
        let mut out = fs::File::create(&out_path)
            .map_err(|e| StattrackError::filesystem("create file", &out_path, e))?;
        extracted.push(out_path.clone());
        io::copy(&mut entry, &mut out)
            .map_err(|e| archive_error(archive, format!("{}: {e}", entry.name())))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o7777))
                .map_err(|e| StattrackError::filesystem("chmod", &out_path, e))?;
        }
    }
    Ok(())
}

fn archive_error(archive: &Path, reason: String) -> StattrackError {
    StattrackError::ArchiveError {
        path: archive.to_path_buf(),
        reason,
    }
}
