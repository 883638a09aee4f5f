//! Legacy operating system overrides.
//!
//! Old kernels cannot run current CLI builds, so hosts below a kernel threshold
//! are pinned to a fixed release tag. Entries for an OS are evaluated in order
//! and the first threshold above the running kernel wins.

use semver::Version;
use std::collections::HashMap;
use tracing::debug;

use crate::platform::Os;

/// One override: hosts whose kernel is below `kernel_less_than` run `tag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyOverride {
    pub kernel_less_than: Version,
    pub tag: String,
}

impl LegacyOverride {
    pub fn new(kernel_less_than: Version, tag: impl Into<String>) -> Self {
        Self {
            kernel_less_than,
            tag: tag.into(),
        }
    }
}

/// Ordered overrides per operating system.
#[derive(Debug, Clone, Default)]
pub struct LegacyOverrideTable {
    entries: HashMap<Os, Vec<LegacyOverride>>,
}

impl LegacyOverrideTable {
    /// Empty table; no host is ever pinned.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in overrides: macOS before High Sierra (Darwin 17) stays on
    /// `v1.39.1-alpha.1`.
    pub fn builtin() -> Self {
        Self::empty().with(Os::Darwin, LegacyOverride::new(Version::new(17, 0, 0), "v1.39.1-alpha.1"))
    }

    /// Append an override for `os`, after any existing ones.
    pub fn with(mut self, os: Os, entry: LegacyOverride) -> Self {
        self.entries.entry(os).or_default().push(entry);
        self
    }

    /// Tag for a host running `os` with kernel release `kernel`.
    ///
    /// A kernel string that cannot be read as a version never matches.
    pub fn tag_for(&self, os: &Os, kernel: &str) -> Option<&str> {
        let entries = self.entries.get(os)?;
        let Some(kernel_version) = parse_kernel_version(kernel) else {
            debug!("Unparseable kernel release '{}', no legacy override applies", kernel);
            return None;
        };
        entries
            .iter()
            .find(|entry| kernel_version < entry.kernel_less_than)
            .map(|entry| entry.tag.as_str())
    }
}

/// Read a kernel release such as `16.7.0`, `5.15.0-91-generic` or `10.0` as a
/// semantic version.
///
/// Strings that are valid semver are used as-is (so a distro suffix becomes a
/// pre-release and sorts just below the base version). Otherwise the leading
/// dotted numbers are taken and padded to three components.
pub fn parse_kernel_version(kernel: &str) -> Option<Version> {
    let kernel = kernel.trim();
    if kernel.is_empty() {
        return None;
    }
    if let Ok(version) = Version::parse(kernel) {
        return Some(version);
    }

    let numeric: String =
        kernel.chars().take_while(|c| c.is_ascii_digit() || *c == '.').collect();
    let mut parts = numeric.split('.').filter(|part| !part.is_empty());
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    Some(Version::new(major, minor, patch))
}
