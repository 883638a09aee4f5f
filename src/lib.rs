//! stattrack-deps - self-updating installer for the stattrack CLI
//!
//! Locates, verifies, downloads and installs the `stattrack` command-line
//! tool that editor integrations shell out to. A single call to
//! [`manager::CliManager::check_and_install`] makes sure a runnable, current
//! binary is in place.
//!
//! # Architecture Overview
//!
//! ```text
//! platform ──► release ──► installer ◄── locator
//!                 │            ▲            │
//!                 ▼            │            ▼
//!               oracle ──►  update  ◄───────┘
//!                              │
//!                              ▼
//!                           manager
//! ```
//!
//! - A binary found on `PATH` is user-managed and never replaced.
//! - Otherwise the binary lives in the resources directory as
//!   `stattrack-<os>-<arch>[.exe]`, with a stable `stattrack` alias.
//! - Hosts on kernels too old for current builds are pinned to a legacy
//!   release.
//! - The latest release is looked up at most once per cooldown window.
//! - A failed update restores the previous binary.
//!
//! # Core Modules
//!
//! - [`platform`] - Host OS and architecture detection
//! - [`release`] - Release tags, legacy overrides, download URLs
//! - [`oracle`] - Latest-version lookup
//! - [`locator`] - Install location and executable state
//! - [`update`] - Update decision
//! - [`installer`] - Download, backup, extraction, activation
//! - [`manager`] - Check-and-install entry point
//!
//! # Supporting Modules
//!
//! - [`settings`] - Key/value settings store
//! - [`net`] - HTTP client construction
//! - [`config`] - Configuration file
//! - [`core`] - Error types
//! - [`constants`] - Names, URLs, timeouts
//! - [`utils`] - Progress display and file helpers
//! - [`cli`] - `stattrack-deps` command-line front end

// Core functionality modules
pub mod installer;
pub mod locator;
pub mod manager;
pub mod oracle;
pub mod platform;
pub mod release;
pub mod update;

// Supporting modules
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod net;
pub mod settings;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
