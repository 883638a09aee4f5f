//! Test utilities for stattrack-deps
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration tests.
//!
//! - [`fixtures`] builds zip archives and executables on disk
//! - [`fakes`] provides in-process stand-ins for every external collaborator
//!   of [`crate::manager::CliManager`]
//!
//! # Example
//!
//! ```rust,no_run
//! use stattrack_deps::test_utils::{StaticFetcher, ZipFixture};
//!
//! let archive = ZipFixture::new().file("stattrack-linux-amd64", b"bin").to_bytes();
//! let fetcher = StaticFetcher::serving(archive);
//! ```

pub mod fakes;
pub mod fixtures;

pub use fakes::{CountingOracle, FakeProbe, RecordingObserver, RecordingReporter, StaticFetcher};
pub use fixtures::{ZipFixture, break_checksum, write_executable};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests, once per process.
///
/// Uses `level` if given, otherwise `RUST_LOG`; with neither, logging stays
/// off.
///
/// ```bash
/// RUST_LOG=stattrack_deps=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
