//! Download progress reporting.
//!
//! The installer emits [`DownloadProgress`] events to a [`ProgressObserver`],
//! at most once per throttle interval. Two observers are provided:
//!
//! - [`LogProgress`] writes a compact text bar through `tracing`, suitable for
//!   library use and log files.
//! - [`DownloadBar`] drives an `indicatif` bar for interactive terminals.
//!
//! # Environment Variables
//!
//! - `STATTRACK_NO_PROGRESS`: Set to any value to hide interactive bars

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::info;

/// Environment variable that disables interactive progress bars.
pub const NO_PROGRESS_ENV: &str = "STATTRACK_NO_PROGRESS";

/// Width of the text bar rendered by [`DownloadProgress`]'s `Display`.
const TEXT_BAR_WIDTH: usize = 20;

/// Whether interactive progress bars are disabled.
pub fn is_progress_disabled() -> bool {
    std::env::var_os(NO_PROGRESS_ENV).is_some()
}

/// Bytes received so far out of the advertised total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: u64,
}

impl DownloadProgress {
    pub fn new(downloaded: u64, total: u64) -> Self {
        Self { downloaded, total }
    }

    /// Completion in percent, `0.0` when the total is unknown.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.downloaded as f64 / self.total as f64) * 100.0
        }
    }

    /// Text bar of `width` cells, filled proportionally.
    pub fn bar(&self, width: usize) -> String {
        let filled = if self.total == 0 {
            0
        } else {
            ((width as f64 * self.downloaded as f64) / self.total as f64).round() as usize
        };
        let filled = filled.min(width);
        format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
    }
}

impl fmt::Display for DownloadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Downloading: [{}] {:.2}% ({}/{} bytes)",
            self.bar(TEXT_BAR_WIDTH),
            self.percentage(),
            self.downloaded,
            self.total
        )
    }
}

/// Receives download progress.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, progress: DownloadProgress);

    /// Called once the transfer has ended, successfully or not.
    fn on_finish(&self) {}
}

/// Observer that logs each update at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn on_progress(&self, progress: DownloadProgress) {
        info!("{}", progress);
    }
}

/// Interactive byte-count progress bar.
///
/// Hidden when `STATTRACK_NO_PROGRESS` is set.
pub struct DownloadBar {
    inner: IndicatifBar,
}

impl DownloadBar {
    pub fn new(prefix: impl Into<String>) -> Self {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(0);
            bar.set_style(download_style());
            bar
        };
        bar.set_prefix(prefix.into());
        Self { inner: bar }
    }

    /// Bar that never draws.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    pub fn position(&self) -> u64 {
        self.inner.position()
    }

    pub fn length(&self) -> Option<u64> {
        self.inner.length()
    }
}

impl ProgressObserver for DownloadBar {
    fn on_progress(&self, progress: DownloadProgress) {
        self.inner.set_length(progress.total);
        self.inner.set_position(progress.downloaded);
    }

    fn on_finish(&self) {
        self.inner.finish_and_clear();
    }
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap_or_else(|_| IndicatifStyle::default_bar())
        .progress_chars("━╸━")
}

/// Lets an event through at most once per interval.
///
/// The interval is measured from construction, so the first event is only
/// emitted once a full interval has elapsed.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Instant,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            last: start,
        }
    }

    /// Whether an event at `now` should be emitted; if so, restarts the window.
    pub fn ready_at(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }

    pub fn ready(&mut self) -> bool {
        self.ready_at(Instant::now())
    }
}
