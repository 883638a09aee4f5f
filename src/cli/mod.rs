//! Command-line interface for stattrack-deps.
//!
//! # Commands
//!
//! - `check` - Report whether the CLI needs installing or updating
//! - `install` - Install or update the CLI when needed
//! - `locate` - Show where the CLI lives and whether it can run
//! - `platform` - Show the detected platform and its release
//! - `settings` - Read or write a stored setting
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - Debug logging
//! - `--quiet` / `-q` - No logging
//! - `--no-progress` - Plain log lines instead of a progress bar
//! - `--config <path>` / `-c` - Configuration file
//! - `--resources-dir <path>` - Override the managed resources directory

mod check;
mod install;
mod locate;
mod platform;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::ManagerConfig;
use crate::manager::CliManager;
use crate::utils::progress::{DownloadBar, LogProgress, ProgressObserver, is_progress_disabled};

/// Options shared by every command, resolved from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// `None` disables logging.
    pub log_level: Option<String>,
    pub no_progress: bool,
    pub config_path: Option<PathBuf>,
    pub resources_dir: Option<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the configuration file and apply command-line overrides.
    pub async fn load_config(&self) -> Result<ManagerConfig> {
        let mut config = ManagerConfig::load_with_optional(self.config_path.clone()).await?;
        if let Some(dir) = &self.resources_dir {
            config.resources_dir = dir.display().to_string();
        }
        Ok(config)
    }

    /// Manager wired to the real network, filesystem and settings.
    pub async fn build_manager(&self) -> Result<CliManager> {
        let config = self.load_config().await?;
        let manager = CliManager::builder(config).observer(self.progress_observer()).build().await?;
        Ok(manager)
    }

    fn progress_observer(&self) -> Arc<dyn ProgressObserver> {
        if self.no_progress || is_progress_disabled() {
            Arc::new(LogProgress)
        } else {
            Arc::new(DownloadBar::new("stattrack"))
        }
    }
}

/// Install a `tracing` subscriber writing to stderr.
///
/// `RUST_LOG` takes precedence over `level`; with neither, nothing is logged.
pub fn init_logging(level: Option<&str>) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if let Some(level) = level {
        EnvFilter::new(format!("stattrack_deps={level}"))
    } else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Parser)]
#[command(
    name = "stattrack-deps",
    about = "Install and update the stattrack CLI",
    version,
    long_about = "Keeps the stattrack command-line tool installed and current: detects the platform, \
                  checks the installed version against the latest release and installs it when needed."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Managed resources directory
    #[arg(long, global = true)]
    resources_dir: Option<PathBuf>,

    /// Disable the download progress bar
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether the CLI needs installing or updating
    Check(check::CheckCommand),

    /// Install or update the CLI when needed
    Install(install::InstallCommand),

    /// Show where the CLI lives and whether it can run
    Locate(locate::LocateCommand),

    /// Show the detected platform and its release
    Platform(platform::PlatformCommand),

    /// Read or write a stored setting
    Settings(settings::SettingsCommand),
}

impl Cli {
    /// Initialize logging and run the selected command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        init_logging(config.log_level.as_deref());
        self.execute_with_config(config).await
    }

    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress,
            config_path: self.config.clone(),
            resources_dir: self.resources_dir.clone(),
        }
    }

    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Check(cmd) => cmd.execute(&config).await,
            Commands::Install(cmd) => cmd.execute(&config).await,
            Commands::Locate(cmd) => cmd.execute(&config).await,
            Commands::Platform(cmd) => cmd.execute(&config).await,
            Commands::Settings(cmd) => cmd.execute(&config).await,
        }
    }
}
