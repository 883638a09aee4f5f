//! Top-level entry point: keep the CLI installed and current.
//!
//! [`CliManager`] owns everything that lives across check cycles: the
//! memoized install location, the "installed" flag and the lock that keeps
//! two cycles on the same manager from overlapping. Collaborators that talk
//! to the outside world (settings, oracle, version probe, fetcher, reporter)
//! are trait objects and can be swapped through [`CliManagerBuilder`].
//!
//! # Example
//!
//! ```rust,no_run
//! use stattrack_deps::config::ManagerConfig;
//! use stattrack_deps::manager::CliManager;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ManagerConfig::load().await?;
//! let manager = CliManager::builder(config).build().await?;
//! let outcome = manager.check_and_install().await;
//! println!("{outcome}: {}", manager.cli_location().display());
//! # Ok(())
//! # }
//! ```

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ManagerConfig;
use crate::core::{Result, StattrackError};
use crate::installer::{ArchiveFetcher, HttpFetcher, Installer};
use crate::locator::{BinaryLocator, ExecutableState, InstallLocation, executable_state};
use crate::oracle::{GithubReleaseOracle, VersionOracle};
use crate::platform::{self, PlatformSignature};
use crate::release::{HttpPlatformReporter, LegacyOverrideTable, PlatformReporter, ReleaseResolver};
use crate::settings::{FileSettings, SettingsProvider};
use crate::update::{ProcessProbe, UpdateChecker, UpdateDecision, VersionProbe};
use crate::utils::fs::ensure_dir;
use crate::utils::progress::{LogProgress, ProgressObserver};

/// Result of one [`CliManager::check_and_install`] cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No install was needed.
    AlreadyCurrent,
    /// A new binary was installed.
    Installed,
    /// An install was attempted and failed.
    Failed,
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AlreadyCurrent => "already current",
            Self::Installed => "installed",
            Self::Failed => "failed",
        })
    }
}

/// Keeps the `stattrack` CLI installed and up to date.
pub struct CliManager {
    config: ManagerConfig,
    settings: Arc<dyn SettingsProvider>,
    locator: Arc<BinaryLocator>,
    resolver: Arc<ReleaseResolver>,
    checker: UpdateChecker,
    installer: Installer,
    observer: Arc<dyn ProgressObserver>,
    installed: AtomicBool,
    cycle: Mutex<()>,
}

impl CliManager {
    pub fn builder(config: ManagerConfig) -> CliManagerBuilder {
        CliManagerBuilder::new(config)
    }

    /// Run one check cycle and install when needed.
    ///
    /// Never fails: errors are logged and reported as
    /// [`InstallOutcome::Failed`]. Concurrent calls on the same manager run
    /// one after the other.
    pub async fn check_and_install(&self) -> InstallOutcome {
        let _cycle = self.cycle.lock().await;
        debug!("Checking if stattrack is installed");

        match self.decide().await {
            UpdateDecision::UpToDate => {
                debug!("stattrack is up to date, no download needed");
                InstallOutcome::AlreadyCurrent
            }
            decision => {
                info!("stattrack {}, installing", decision);
                self.run_install().await
            }
        }
    }

    /// Update decision for the current state, without installing.
    pub async fn check(&self) -> UpdateDecision {
        let _cycle = self.cycle.lock().await;
        self.decide().await
    }

    /// Install unconditionally.
    pub async fn install(&self) -> InstallOutcome {
        let _cycle = self.cycle.lock().await;
        self.run_install().await
    }

    async fn decide(&self) -> UpdateDecision {
        if !self.is_cli_installed() {
            return UpdateDecision::NeedsInstall;
        }
        let location = self.locator.resolve_location();
        self.checker.decide(&location).await
    }

    async fn run_install(&self) -> InstallOutcome {
        match self.installer.install(self.observer.as_ref()).await {
            Ok(path) => {
                self.installed.store(true, Ordering::SeqCst);
                info!("stattrack installed at {}", path.display());
                InstallOutcome::Installed
            }
            Err(e) => {
                warn!("Failed to install stattrack: {}", e);
                InstallOutcome::Failed
            }
        }
    }

    /// Whether a runnable binary is at the resolved location.
    ///
    /// Once true, the answer is cached for the lifetime of the manager.
    pub fn is_cli_installed(&self) -> bool {
        if self.installed.load(Ordering::SeqCst) {
            return true;
        }

        let location = self.locator.resolve_location();
        match executable_state(location.path()) {
            ExecutableState::Installed => {
                debug!("stattrack found at {}", location.path().display());
                self.installed.store(true, Ordering::SeqCst);
                true
            }
            ExecutableState::NotPresent => {
                info!("stattrack not found at {}", location.path().display());
                false
            }
            ExecutableState::PresentNotExecutable => {
                warn!("stattrack at {} is not executable", location.path().display());
                false
            }
        }
    }

    /// Path of the authoritative binary (global if on `PATH`).
    pub fn cli_location(&self) -> PathBuf {
        self.locator.resolve_location().path().to_path_buf()
    }

    /// Path of the binary on `PATH`, if the resolved location is global.
    pub fn global_location(&self) -> Option<PathBuf> {
        match self.locator.resolve_location() {
            InstallLocation::Global(path) => Some(path),
            InstallLocation::Local(_) => None,
        }
    }

    pub fn location(&self) -> InstallLocation {
        self.locator.resolve_location()
    }

    pub fn platform(&self) -> &PlatformSignature {
        self.locator.signature()
    }

    pub fn locator(&self) -> &BinaryLocator {
        &self.locator
    }

    pub fn resolver(&self) -> &ReleaseResolver {
        &self.resolver
    }

    pub fn settings(&self) -> &Arc<dyn SettingsProvider> {
        &self.settings
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }
}

/// Assembles a [`CliManager`], defaulting every collaborator to the real one.
pub struct CliManagerBuilder {
    config: ManagerConfig,
    resources_dir: Option<PathBuf>,
    settings: Option<Arc<dyn SettingsProvider>>,
    oracle: Option<Arc<dyn VersionOracle>>,
    probe: Option<Arc<dyn VersionProbe>>,
    fetcher: Option<Arc<dyn ArchiveFetcher>>,
    reporter: Option<Arc<dyn PlatformReporter>>,
    observer: Option<Arc<dyn ProgressObserver>>,
    signature: Option<PlatformSignature>,
    kernel_release: Option<String>,
    overrides: Option<LegacyOverrideTable>,
    search_path: Option<OsString>,
}

impl CliManagerBuilder {
    fn new(config: ManagerConfig) -> Self {
        Self {
            config,
            resources_dir: None,
            settings: None,
            oracle: None,
            probe: None,
            fetcher: None,
            reporter: None,
            observer: None,
            signature: None,
            kernel_release: None,
            overrides: None,
            search_path: None,
        }
    }

    /// Use `dir` instead of the configured resources directory.
    pub fn resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = Some(dir.into());
        self
    }

    pub fn settings(mut self, settings: Arc<dyn SettingsProvider>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn oracle(mut self, oracle: Arc<dyn VersionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn probe(mut self, probe: Arc<dyn VersionProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn ArchiveFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn PlatformReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Pretend to run on `signature` instead of the detected host.
    pub fn platform(mut self, signature: PlatformSignature) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn kernel_release(mut self, kernel: impl Into<String>) -> Self {
        self.kernel_release = Some(kernel.into());
        self
    }

    pub fn legacy_overrides(mut self, overrides: LegacyOverrideTable) -> Self {
        self.overrides = Some(overrides);
        self
    }

    /// Look for a global binary in `paths` instead of the process `PATH`.
    pub fn search_path(mut self, paths: impl Into<OsString>) -> Self {
        self.search_path = Some(paths.into());
        self
    }

    /// Build the manager, creating the resources directory if needed.
    ///
    /// # Errors
    ///
    /// Fails if a configured path cannot be expanded or the resources
    /// directory cannot be created.
    pub async fn build(self) -> Result<CliManager> {
        let config = self.config;
        let resources_dir = match self.resources_dir {
            Some(dir) => dir,
            None => config.resources_path().map_err(config_error)?,
        };
        if !resources_dir.exists() {
            info!("Creating resources directory {}", resources_dir.display());
        }
        ensure_dir(&resources_dir).await?;

        let settings: Arc<dyn SettingsProvider> = match self.settings {
            Some(settings) => settings,
            None => Arc::new(FileSettings::new(
                config.settings_path().map_err(config_error)?,
                config.internal_settings_path().map_err(config_error)?,
            )),
        };

        let signature = self.signature.unwrap_or_else(platform::identify);
        let kernel = self.kernel_release.unwrap_or_else(platform::kernel_release);
        let reporter = self.reporter.unwrap_or_else(|| {
            Arc::new(HttpPlatformReporter::new(
                config.missing_platform_url.clone(),
                config.plugin.clone(),
                config.network_timeout(),
                Arc::clone(&settings),
            ))
        });
        let resolver = Arc::new(ReleaseResolver::new(
            &config,
            self.overrides.unwrap_or_else(LegacyOverrideTable::builtin),
            kernel,
            reporter,
        ));

        let mut locator = BinaryLocator::new(&resources_dir, config.binary_name.clone(), signature.clone());
        if let Some(paths) = self.search_path {
            locator = locator.with_search_path(paths);
        }
        let locator = Arc::new(locator);

        let oracle = self.oracle.unwrap_or_else(|| {
            Arc::new(GithubReleaseOracle::new(
                config.releases_url.clone(),
                config.network_timeout(),
                Arc::clone(&settings),
            ))
        });
        let probe = self
            .probe
            .unwrap_or_else(|| Arc::new(ProcessProbe::new(config.version_timeout())));
        let checker = UpdateChecker::new(
            signature,
            Arc::clone(&resolver),
            oracle,
            probe,
            Arc::clone(&settings),
            config.cooldown(),
        );

        let fetcher = self.fetcher.unwrap_or_else(|| {
            Arc::new(HttpFetcher::new(
                config.network_timeout(),
                config.progress_interval(),
                Arc::clone(&settings),
            ))
        });
        let installer = Installer::new(Arc::clone(&locator), Arc::clone(&resolver), fetcher);
        let observer = self.observer.unwrap_or_else(|| Arc::new(LogProgress));

        debug!("stattrack resources directory: {}", resources_dir.display());
        Ok(CliManager {
            config,
            settings,
            locator,
            resolver,
            checker,
            installer,
            observer,
            installed: AtomicBool::new(false),
            cycle: Mutex::new(()),
        })
    }
}

fn config_error(error: anyhow::Error) -> StattrackError {
    StattrackError::ConfigurationError {
        message: format!("{error:#}"),
    }
}
