//! Host platform identification.
//!
//! Maps the running host to the normalized `(os, arch)` pair used in release
//! archive names, e.g. `linux-amd64` or `windows-386`. Normalization follows
//! the naming of the published StatTrack builds rather than Rust's target
//! triples: `win32` becomes `windows`, anything containing `32` becomes `386`,
//! `x64`/`x86_64` become `amd64`, and `aarch64` becomes `arm64`. Unknown names
//! pass through unchanged so an unlisted host still gets a best-effort URL.

use std::fmt;
use std::sync::OnceLock;

/// Operating system component of a [`PlatformSignature`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    Darwin,
    Windows,
    Linux,
    FreeBsd,
    NetBsd,
    OpenBsd,
    /// Any other host, carrying its raw name.
    Other(String),
}

impl Os {
    /// Normalize a raw OS name (`std::env::consts::OS` or a Node-style
    /// platform string).
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "darwin" | "macos" => Self::Darwin,
            "win32" | "windows" => Self::Windows,
            "linux" => Self::Linux,
            "freebsd" => Self::FreeBsd,
            "netbsd" => Self::NetBsd,
            "openbsd" => Self::OpenBsd,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Darwin => "darwin",
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::FreeBsd => "freebsd",
            Self::NetBsd => "netbsd",
            Self::OpenBsd => "openbsd",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Self::Windows)
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CPU architecture component of a [`PlatformSignature`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    I386,
    Amd64,
    Arm,
    Arm64,
    /// Any other architecture, carrying its raw name.
    Other(String),
}

impl Arch {
    /// Normalize a raw architecture name.
    ///
    /// Substring rules come first: any name containing `32` is `386` and any
    /// name containing `x64` is `amd64`.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim().to_ascii_lowercase();
        if raw.contains("32") {
            return Self::I386;
        }
        if raw.contains("x64") || raw == "x86_64" {
            return Self::Amd64;
        }
        match raw.as_str() {
            "386" | "x86" | "i386" | "i686" => Self::I386,
            "amd64" => Self::Amd64,
            "arm" => Self::Arm,
            "arm64" | "aarch64" => Self::Arm64,
            _ => Self::Other(raw),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::I386 => "386",
            Self::Amd64 => "amd64",
            Self::Arm => "arm",
            Self::Arm64 => "arm64",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized `(os, arch)` pair of a host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformSignature {
    pub os: Os,
    pub arch: Arch,
}

impl PlatformSignature {
    pub fn new(os: Os, arch: Arch) -> Self {
        Self { os, arch }
    }

    /// Build a signature from raw host names.
    pub fn from_raw(os: &str, arch: &str) -> Self {
        Self::new(Os::from_raw(os), Arch::from_raw(arch))
    }

    /// `"{os}-{arch}"`, as used in archive names and the supported-platform list.
    pub fn label(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }

    /// Executable extension for this platform.
    pub fn exe_suffix(&self) -> &'static str {
        if self.os.is_windows() { ".exe" } else { "" }
    }

    /// Versioned executable file name, e.g. `stattrack-linux-amd64`.
    pub fn binary_file_name(&self, binary_name: &str) -> String {
        format!("{}-{}{}", binary_name, self.label(), self.exe_suffix())
    }

    /// Stable, version-independent executable file name, e.g. `stattrack`.
    pub fn alias_file_name(&self, binary_name: &str) -> String {
        format!("{}{}", binary_name, self.exe_suffix())
    }

    /// Release archive file name, e.g. `stattrack-linux-amd64.zip`.
    pub fn archive_file_name(&self, binary_name: &str) -> String {
        format!("{}-{}{}", binary_name, self.label(), crate::constants::ARCHIVE_EXTENSION)
    }
}

impl fmt::Display for PlatformSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Identify the running host. Computed once per process.
pub fn identify() -> PlatformSignature {
    static SIGNATURE: OnceLock<PlatformSignature> = OnceLock::new();
    SIGNATURE
        .get_or_init(|| PlatformSignature::from_raw(std::env::consts::OS, std::env::consts::ARCH))
        .clone()
}

/// Kernel release of the running host (`uname -r`), or an empty string when
/// it cannot be determined.
pub fn kernel_release() -> String {
    #[cfg(unix)]
    {
        if let Ok(release) = std::fs::read_to_string("/proc/sys/kernel/osrelease") {
            return release.trim().to_string();
        }
        match std::process::Command::new("uname").arg("-r").output() {
            Ok(output) if output.status.success() => {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            }
            _ => String::new(),
        }
    }

    #[cfg(not(unix))]
    {
        String::new()
    }
}
