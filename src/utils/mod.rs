//! Shared helpers
//!
//! - [`fs`] - Resources-directory file operations, critical and best-effort
//! - [`progress`] - Download progress events, throttling and display

pub mod fs;
pub mod progress;

pub use fs::{ensure_dir, remove_file_best_effort, remove_file_if_exists};
pub use progress::{
    DownloadBar, DownloadProgress, LogProgress, ProgressObserver, ProgressThrottle,
    is_progress_disabled,
};
