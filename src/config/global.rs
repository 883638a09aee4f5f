//! Global configuration for the dependency manager.
//!
//! The configuration lives at `~/.stattrack/deps.toml` on Unix/macOS and
//! `%LOCALAPPDATA%\stattrack\deps.toml` on Windows. The location can be
//! overridden using the `STATTRACK_DEPS_CONFIG` environment variable. A missing
//! file is not an error: every field has a default matching the published
//! StatTrack release layout.
//!
//! # Example
//!
//! ```toml
//! resources_dir = "~/.stattrack"
//! current_tag = "v1.0.0"
//! network_timeout_secs = 30
//! cooldown_secs = 14400
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

use crate::constants;

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "STATTRACK_DEPS_CONFIG";

/// Settings that control where the CLI is installed and which releases are used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Managed resources directory holding the binary, its alias and transient
    /// archives. Supports `~` and environment variable expansion.
    #[serde(default = "default_resources_dir")]
    pub resources_dir: String,

    /// Base name of the managed executable.
    #[serde(default = "default_binary_name")]
    pub binary_name: String,

    /// GitHub organisation hosting release archives.
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// GitHub repository hosting release archives.
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Release tag installed when no legacy override applies.
    #[serde(default = "default_current_tag")]
    pub current_tag: String,

    /// Base URL for release downloads. `{owner}/{repo}/releases/download/...`
    /// is appended.
    #[serde(default = "default_download_host")]
    pub download_host: String,

    /// Release-listing endpoint used to discover the latest tag.
    #[serde(default = "default_releases_url")]
    pub releases_url: String,

    /// Endpoint receiving missing-platform reports.
    #[serde(default = "default_missing_platform_url")]
    pub missing_platform_url: String,

    /// Client identifier sent with missing-platform reports.
    #[serde(default = "default_plugin")]
    pub plugin: String,

    /// Timeout applied to every network request, in seconds.
    #[serde(default = "default_network_timeout_secs")]
    pub network_timeout_secs: u64,

    /// Timeout for the `--version` probe, in seconds.
    #[serde(default = "default_version_timeout_secs")]
    pub version_timeout_secs: u64,

    /// Minimum gap between remote version queries, in seconds.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Minimum gap between download progress updates, in milliseconds.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Settings file holding user-facing options (`proxy`, `no_ssl_verify`).
    /// Defaults to `<resources_dir>/settings.toml`.
    #[serde(default)]
    pub settings_file: Option<String>,

    /// Settings file holding internal values (`cli_version_last_accessed`).
    /// Defaults to `<resources_dir>/internal.toml`.
    #[serde(default)]
    pub internal_settings_file: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            resources_dir: default_resources_dir(),
            binary_name: default_binary_name(),
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            current_tag: default_current_tag(),
            download_host: default_download_host(),
            releases_url: default_releases_url(),
            missing_platform_url: default_missing_platform_url(),
            plugin: default_plugin(),
            network_timeout_secs: default_network_timeout_secs(),
            version_timeout_secs: default_version_timeout_secs(),
            cooldown_secs: default_cooldown_secs(),
            progress_interval_ms: default_progress_interval_ms(),
            settings_file: None,
            internal_settings_file: None,
        }
    }
}

fn default_resources_dir() -> String {
    if cfg!(target_os = "windows") {
        "${LOCALAPPDATA}/stattrack".to_string()
    } else {
        "~/.stattrack".to_string()
    }
}

fn default_binary_name() -> String {
    constants::BINARY_NAME.to_string()
}

fn default_repo_owner() -> String {
    constants::REPO_OWNER.to_string()
}

fn default_repo_name() -> String {
    constants::REPO_NAME.to_string()
}

fn default_current_tag() -> String {
    constants::CURRENT_RELEASE_TAG.to_string()
}

fn default_download_host() -> String {
    "https://github.com".to_string()
}

fn default_releases_url() -> String {
    constants::RELEASES_URL.to_string()
}

fn default_missing_platform_url() -> String {
    constants::MISSING_PLATFORM_URL.to_string()
}

fn default_plugin() -> String {
    constants::PLUGIN_ID.to_string()
}

fn default_network_timeout_secs() -> u64 {
    constants::NETWORK_TIMEOUT.as_secs()
}

fn default_version_timeout_secs() -> u64 {
    constants::VERSION_PROBE_TIMEOUT.as_secs()
}

fn default_cooldown_secs() -> u64 {
    constants::VERSION_CHECK_COOLDOWN.as_secs()
}

fn default_progress_interval_ms() -> u64 {
    constants::PROGRESS_INTERVAL.as_millis() as u64
}

impl ManagerConfig {
    /// Load configuration from `STATTRACK_DEPS_CONFIG` or the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self> {
        Self::load_with_optional(None).await
    }

    /// Load configuration from `path`, falling back to [`Self::default_path`].
    ///
    /// A missing file yields the default configuration.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Configuration file location, honoring `STATTRACK_DEPS_CONFIG`.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            if !path.is_empty() {
                return Ok(PathBuf::from(path));
            }
        }

        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("stattrack")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".stattrack")
        };

        Ok(config_dir.join("deps.toml"))
    }

    /// Resources directory with `~` and environment variables expanded.
    pub fn resources_path(&self) -> Result<PathBuf> {
        expand_path(&self.resources_dir)
    }

    /// Path of the user-facing settings file.
    pub fn settings_path(&self) -> Result<PathBuf> {
        match &self.settings_file {
            Some(path) => expand_path(path),
            None => Ok(self.resources_path()?.join("settings.toml")),
        }
    }

    /// Path of the internal settings file.
    pub fn internal_settings_path(&self) -> Result<PathBuf> {
        match &self.internal_settings_file {
            Some(path) => expand_path(path),
            None => Ok(self.resources_path()?.join("internal.toml")),
        }
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    pub fn version_timeout(&self) -> Duration {
        Duration::from_secs(self.version_timeout_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    let expanded = shellexpand::full(raw)
        .with_context(|| format!("Failed to expand path '{raw}'"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
