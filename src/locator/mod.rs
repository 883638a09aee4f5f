//! Installed-binary location.
//!
//! A `stattrack` executable found on `PATH` is a *global* install: the user
//! manages it, so it is always considered current and never replaced.
//! Otherwise the CLI lives in the managed resources directory under its
//! versioned name (`stattrack-<os>-<arch>[.exe]`).
//!
//! The resolved location is memoized for the lifetime of the locator. A later
//! install that changes what is on `PATH` is picked up by the next process,
//! not by this one.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

use crate::constants::BACKUP_SUFFIX;
use crate::platform::PlatformSignature;

/// Where the authoritative CLI binary lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallLocation {
    /// Found on the system `PATH`; never auto-updated.
    Global(PathBuf),
    /// Inside the managed resources directory; subject to update checks.
    Local(PathBuf),
}

impl InstallLocation {
    pub fn path(&self) -> &Path {
        match self {
            Self::Global(path) | Self::Local(path) => path,
        }
    }

    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global(_))
    }
}

impl fmt::Display for InstallLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global(path) => write!(f, "{} (global)", path.display()),
            Self::Local(path) => write!(f, "{} (managed)", path.display()),
        }
    }
}

/// Whether a binary at some path can be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableState {
    Installed,
    NotPresent,
    PresentNotExecutable,
}

impl fmt::Display for ExecutableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Installed => "installed",
            Self::NotPresent => "not present",
            Self::PresentNotExecutable => "present but not executable",
        })
    }
}

/// Resolves the CLI's install location and state.
pub struct BinaryLocator {
    resources_dir: PathBuf,
    binary_name: String,
    signature: PlatformSignature,
    search_path: Option<OsString>,
    location: OnceLock<InstallLocation>,
}

impl BinaryLocator {
    pub fn new(
        resources_dir: impl Into<PathBuf>,
        binary_name: impl Into<String>,
        signature: PlatformSignature,
    ) -> Self {
        Self {
            resources_dir: resources_dir.into(),
            binary_name: binary_name.into(),
            signature,
            search_path: None,
            location: OnceLock::new(),
        }
    }

    /// Search `paths` (in `PATH` syntax) instead of the process `PATH`.
    pub fn with_search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    pub fn resources_dir(&self) -> &Path {
        &self.resources_dir
    }

    pub fn binary_name(&self) -> &str {
        &self.binary_name
    }

    pub fn signature(&self) -> &PlatformSignature {
        &self.signature
    }

    /// Versioned binary inside the resources directory.
    pub fn local_path(&self) -> PathBuf {
        self.resources_dir.join(self.signature.binary_file_name(&self.binary_name))
    }

    /// Stable-name alias inside the resources directory.
    pub fn alias_path(&self) -> PathBuf {
        self.resources_dir.join(self.signature.alias_file_name(&self.binary_name))
    }

    /// Backup sibling of the versioned binary.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.local_path().into_os_string();
        name.push(BACKUP_SUFFIX);
        PathBuf::from(name)
    }

    /// `stattrack[.exe]` on the search path, if any.
    pub fn global_path(&self) -> Option<PathBuf> {
        let name = self.signature.alias_file_name(&self.binary_name);
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| self.resources_dir.clone());
                which::which_in(&name, Some(paths), cwd)
            }
            None => which::which(&name),
        };
        found.ok()
    }

    /// Resolve (once) the authoritative install location.
    pub fn resolve_location(&self) -> InstallLocation {
        self.location
            .get_or_init(|| match self.global_path() {
                Some(path) => {
                    debug!("Using global stattrack location: {}", path.display());
                    InstallLocation::Global(path)
                }
                None => {
                    let path = self.local_path();
                    debug!("Using local stattrack location: {}", path.display());
                    InstallLocation::Local(path)
                }
            })
            .clone()
    }
}

/// Inspect `path`: missing, present without execute permission, or runnable.
pub fn executable_state(path: &Path) -> ExecutableState {
    let Ok(metadata) = std::fs::metadata(path) else {
        return ExecutableState::NotPresent;
    };
    if !metadata.is_file() {
        return ExecutableState::PresentNotExecutable;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return ExecutableState::PresentNotExecutable;
        }
    }

    ExecutableState::Installed
}
