//! Update decision for an installed CLI.
//!
//! The checker answers one question per cycle: is the binary at the resolved
//! location current, missing, or outdated? The order of the checks matters:
//!
//! 1. A global install is user-managed and always current.
//! 2. The binary is asked for `--version`; if it cannot answer it must be
//!    reinstalled.
//! 3. `<local-build>` marks a developer build that is never replaced.
//! 4. A host pinned to a legacy tag must run exactly that tag, whatever the
//!    cooldown says.
//! 5. Within the cooldown window the network is not consulted.
//! 6. Otherwise the remote oracle decides. An unknown latest version counts as
//!    outdated.

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::constants::LOCAL_BUILD_VERSION;
use crate::core::{Result, StattrackError};
use crate::locator::InstallLocation;
use crate::oracle::VersionOracle;
use crate::platform::PlatformSignature;
use crate::release::ReleaseResolver;
use crate::settings::{self, SettingsProvider};

/// Outcome of an update check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateDecision {
    UpToDate,
    NeedsInstall,
    NeedsUpdate,
}

impl UpdateDecision {
    /// Whether the installer should run.
    pub fn requires_install(self) -> bool {
        !matches!(self, Self::UpToDate)
    }
}

impl fmt::Display for UpdateDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UpToDate => "up to date",
            Self::NeedsInstall => "needs install",
            Self::NeedsUpdate => "needs update",
        })
    }
}

/// Reports the version of an installed binary.
#[async_trait]
pub trait VersionProbe: Send + Sync {
    /// Version string printed by `binary --version`.
    async fn current_version(&self, binary: &Path) -> Result<String>;
}

/// Probe that runs the binary as a subprocess.
pub struct ProcessProbe {
    timeout: Duration,
}

impl ProcessProbe {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl VersionProbe for ProcessProbe {
    async fn current_version(&self, binary: &Path) -> Result<String> {
        let subprocess_error = |reason: String| StattrackError::SubprocessError {
            program: binary.to_path_buf(),
            reason,
        };

        let child = Command::new(binary)
            .arg("--version")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| subprocess_error(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| subprocess_error(e.to_string()))?;

        if !output.status.success() {
            return Err(subprocess_error(format!("exited with {}", output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        Ok(format!("{}{}", stdout.trim(), stderr.trim()))
    }
}

/// Decides whether the CLI must be (re)installed.
pub struct UpdateChecker {
    signature: PlatformSignature,
    resolver: Arc<ReleaseResolver>,
    oracle: Arc<dyn VersionOracle>,
    probe: Arc<dyn VersionProbe>,
    settings: Arc<dyn SettingsProvider>,
    cooldown: Duration,
}

impl UpdateChecker {
    pub fn new(
        signature: PlatformSignature,
        resolver: Arc<ReleaseResolver>,
        oracle: Arc<dyn VersionOracle>,
        probe: Arc<dyn VersionProbe>,
        settings: Arc<dyn SettingsProvider>,
        cooldown: Duration,
    ) -> Self {
        Self {
            signature,
            resolver,
            oracle,
            probe,
            settings,
            cooldown,
        }
    }

    /// Evaluate the binary at `location`.
    pub async fn decide(&self, location: &InstallLocation) -> UpdateDecision {
        let binary = match location {
            InstallLocation::Global(path) => {
                debug!("Global stattrack at {} is never auto-updated", path.display());
                return UpdateDecision::UpToDate;
            }
            InstallLocation::Local(path) => path,
        };

        let current = match self.probe.current_version(binary).await {
            Ok(version) => version,
            Err(e) => {
                warn!("Unable to read installed stattrack version: {}", e);
                return UpdateDecision::NeedsInstall;
            }
        };
        debug!("Installed stattrack version: {}", current);

        if current == LOCAL_BUILD_VERSION {
            debug!("Local development build installed, skipping update check");
            return UpdateDecision::UpToDate;
        }

        if let Some(legacy) = self.resolver.legacy_tag(&self.signature) {
            if current != legacy {
                info!("Legacy host must run {}, found {}", legacy, current);
                return UpdateDecision::NeedsUpdate;
            }
        }

        if self.within_cooldown().await {
            debug!("Checked for stattrack updates recently, skipping remote lookup");
            return UpdateDecision::UpToDate;
        }

        let latest = self.oracle.fetch_latest_version().await;
        if latest.is_empty() {
            warn!("Latest stattrack version unknown, treating installed {} as outdated", current);
            return UpdateDecision::NeedsUpdate;
        }
        if latest == current {
            debug!("stattrack {} is the latest version", current);
            UpdateDecision::UpToDate
        } else {
            info!("stattrack {} is available (installed {})", latest, current);
            UpdateDecision::NeedsUpdate
        }
    }

    async fn within_cooldown(&self) -> bool {
        let Some(last) = settings::last_checked(self.settings.as_ref()).await else {
            return false;
        };
        let cooldown = i64::try_from(self.cooldown.as_secs()).unwrap_or(i64::MAX);
        // the window is half-open: at exactly `last + cooldown` the oracle is asked again
        chrono::Utc::now().timestamp() < last.saturating_add(cooldown)
    }
}
