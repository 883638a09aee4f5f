//! Global constants used throughout the stattrack-deps codebase.
//!
//! This module contains endpoint URLs, file naming rules, timeouts and the
//! update-check cooldown. Most of them are defaults that
//! [`ManagerConfig`](crate::config::ManagerConfig) can override.

use std::time::Duration;

/// Base name of the managed executable (`stattrack`, `stattrack.exe`).
pub const BINARY_NAME: &str = "stattrack";

/// GitHub organisation hosting the CLI releases.
pub const REPO_OWNER: &str = "ymohit1603";

/// GitHub repository hosting the CLI releases.
pub const REPO_NAME: &str = "StatTrack-cli";

/// Release tag installed on every platform without a legacy override.
pub const CURRENT_RELEASE_TAG: &str = "v1.0.0";

/// Release-listing endpoint queried by the version oracle.
pub const RELEASES_URL: &str =
    "https://api.github.com/repos/ymohit1603/StatTrack-cli/releases/latest";

/// Fire-and-forget endpoint told about hosts with no published build.
pub const MISSING_PLATFORM_URL: &str = "https://api.stattrack.com/api/v1/cli-missing";

/// Static client identifier sent with missing-platform reports.
pub const PLUGIN_ID: &str = "vscode";

/// User-Agent sent to the release-listing API.
pub const ORACLE_USER_AGENT: &str = "github.com/ymohit1603/vscode-stattrack";

/// User-Agent sent when downloading release archives.
pub const DOWNLOAD_USER_AGENT: &str = "StatTrack-VSCode-Extension";

/// Version string printed by developer builds; such installs are never replaced.
pub const LOCAL_BUILD_VERSION: &str = "<local-build>";

/// Suffix of the sibling file holding the previous binary during extraction.
pub const BACKUP_SUFFIX: &str = ".backup";

/// Extension of downloaded release archives.
pub const ARCHIVE_EXTENSION: &str = ".zip";

/// Settings namespace for user-facing options (`proxy`, `no_ssl_verify`).
pub const SETTINGS_NAMESPACE: &str = "settings";

/// Settings namespace for values managed by this crate.
pub const INTERNAL_NAMESPACE: &str = "internal";

/// Setting holding an optional proxy URL.
pub const PROXY_KEY: &str = "proxy";

/// Setting disabling TLS certificate verification when set to `"true"`.
pub const NO_SSL_VERIFY_KEY: &str = "no_ssl_verify";

/// Internal setting holding the Unix time of the last successful oracle query.
pub const LAST_CHECKED_KEY: &str = "cli_version_last_accessed";

/// Timeout for every network request, downloads included (30 seconds).
pub const NETWORK_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for the `--version` probe of the installed binary (10 seconds).
pub const VERSION_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Minimum time between two remote version queries (4 hours).
pub const VERSION_CHECK_COOLDOWN: Duration = Duration::from_secs(4 * 3600);

/// Minimum wall-clock gap between two observable download progress updates.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Unix permission bits applied to the installed binary and its alias.
#[cfg(unix)]
pub const EXECUTABLE_MODE: u32 = 0o755;
