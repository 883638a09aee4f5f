//! Release resolution: which tag a host runs and where to download it.
//!
//! Download URLs follow the GitHub release layout:
//!
//! ```text
//! https://github.com/<owner>/<repo>/releases/download/<tag>/stattrack-<os>-<arch>.zip
//! ```
//!
//! `<tag>` is the legacy tag when a [`LegacyOverrideTable`] entry applies to the
//! host, and the configured current release otherwise. Hosts outside the
//! [`SUPPORTED_PLATFORMS`] list still get a best-effort URL, and a
//! missing-platform report is fired through the [`PlatformReporter`].

mod legacy;
mod reporter;

pub use legacy::{LegacyOverride, LegacyOverrideTable, parse_kernel_version};
pub use reporter::{HttpPlatformReporter, PlatformReporter};

use std::sync::Arc;
use tracing::{debug, info};

use crate::config::ManagerConfig;
use crate::platform::PlatformSignature;

/// `{os}-{arch}` labels with a published build.
pub const SUPPORTED_PLATFORMS: &[&str] = &[
    "darwin-amd64",
    "darwin-arm64",
    "freebsd-386",
    "freebsd-amd64",
    "freebsd-arm",
    "linux-386",
    "linux-amd64",
    "linux-arm",
    "linux-arm64",
    "netbsd-386",
    "netbsd-amd64",
    "netbsd-arm",
    "openbsd-386",
    "openbsd-amd64",
    "openbsd-arm",
    "openbsd-arm64",
    "windows-386",
    "windows-amd64",
    "windows-arm64",
];

/// Whether `signature` has a published build.
pub fn is_supported(signature: &PlatformSignature) -> bool {
    SUPPORTED_PLATFORMS.contains(&signature.label().as_str())
}

/// Resolves release tags and download URLs for a host.
pub struct ReleaseResolver {
    overrides: LegacyOverrideTable,
    kernel_release: String,
    download_host: String,
    repo_owner: String,
    repo_name: String,
    current_tag: String,
    binary_name: String,
    reporter: Arc<dyn PlatformReporter>,
}

impl ReleaseResolver {
    /// Resolver for the running host's kernel, using `config` for the release
    /// location.
    pub fn new(
        config: &ManagerConfig,
        overrides: LegacyOverrideTable,
        kernel_release: impl Into<String>,
        reporter: Arc<dyn PlatformReporter>,
    ) -> Self {
        Self {
            overrides,
            kernel_release: kernel_release.into(),
            download_host: config.download_host.trim_end_matches('/').to_string(),
            repo_owner: config.repo_owner.clone(),
            repo_name: config.repo_name.clone(),
            current_tag: config.current_tag.clone(),
            binary_name: config.binary_name.clone(),
            reporter,
        }
    }

    pub fn kernel_release(&self) -> &str {
        &self.kernel_release
    }

    /// Legacy tag pinned for `signature` on this host's kernel, if any.
    pub fn legacy_tag(&self, signature: &PlatformSignature) -> Option<String> {
        self.overrides
            .tag_for(&signature.os, &self.kernel_release)
            .map(ToString::to_string)
    }

    /// Tag that `signature` should run.
    pub fn target_tag(&self, signature: &PlatformSignature) -> String {
        self.legacy_tag(signature).unwrap_or_else(|| self.current_tag.clone())
    }

    /// Download URL of the release archive for `signature`.
    ///
    /// Unsupported platforms trigger exactly one missing-platform report per
    /// call; the URL is returned regardless.
    pub fn download_url(&self, signature: &PlatformSignature) -> String {
        let tag = match self.legacy_tag(signature) {
            Some(tag) => {
                debug!("Using legacy release {} for {} (kernel {})", tag, signature, self.kernel_release);
                tag
            }
            None => {
                if !is_supported(signature) {
                    info!("No published build for {}, reporting missing platform", signature);
                    self.reporter.report_missing(signature);
                }
                self.current_tag.clone()
            }
        };
        self.url_for_tag(&tag, signature)
    }

    /// URL that [`download_url`](Self::download_url) would return, without
    /// reporting unsupported platforms.
    pub fn preview_url(&self, signature: &PlatformSignature) -> String {
        self.url_for_tag(&self.target_tag(signature), signature)
    }

    fn url_for_tag(&self, tag: &str, signature: &PlatformSignature) -> String {
        format!(
            "{}/{}/{}/releases/download/{}/{}",
            self.download_host,
            self.repo_owner,
            self.repo_name,
            tag,
            signature.archive_file_name(&self.binary_name)
        )
    }
}
