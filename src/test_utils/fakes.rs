//! In-process stand-ins for network and subprocess collaborators.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::core::{Result, StattrackError};
use crate::installer::ArchiveFetcher;
use crate::oracle::VersionOracle;
use crate::platform::PlatformSignature;
use crate::release::PlatformReporter;
use crate::update::VersionProbe;
use crate::utils::progress::{DownloadProgress, ProgressObserver};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Reporter that remembers every missing-platform report.
#[derive(Default)]
pub struct RecordingReporter {
    reported: Mutex<Vec<PlatformSignature>>,
}

impl RecordingReporter {
    pub fn count(&self) -> usize {
        lock(&self.reported).len()
    }

    pub fn reported(&self) -> Vec<PlatformSignature> {
        lock(&self.reported).clone()
    }
}

impl PlatformReporter for RecordingReporter {
    fn report_missing(&self, signature: &PlatformSignature) {
        lock(&self.reported).push(signature.clone());
    }
}

/// Oracle answering a fixed version and counting lookups.
pub struct CountingOracle {
    latest: String,
    calls: AtomicUsize,
}

impl CountingOracle {
    /// `latest` may be empty to simulate a failed lookup.
    pub fn new(latest: &str) -> Self {
        Self {
            latest: latest.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionOracle for CountingOracle {
    async fn fetch_latest_version(&self) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.latest.clone()
    }
}

/// Version probe with a canned answer.
pub struct FakeProbe {
    version: Option<String>,
    calls: AtomicUsize,
}

impl FakeProbe {
    /// Probe reporting `version`.
    pub fn version(version: &str) -> Self {
        Self {
            version: Some(version.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Probe whose binary cannot be run.
    pub fn failing() -> Self {
        Self {
            version: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VersionProbe for FakeProbe {
    async fn current_version(&self, binary: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.version.clone().ok_or_else(|| StattrackError::SubprocessError {
            program: binary.to_path_buf(),
            reason: "fake probe failure".to_string(),
        })
    }
}

/// Fetcher serving fixed bytes, or failing, and recording requested URLs.
pub struct StaticFetcher {
    body: Option<Vec<u8>>,
    urls: Mutex<Vec<String>>,
    destinations: Mutex<Vec<PathBuf>>,
}

impl StaticFetcher {
    /// Fetcher writing `body` to every destination.
    pub fn serving(body: Vec<u8>) -> Self {
        Self {
            body: Some(body),
            urls: Mutex::new(Vec::new()),
            destinations: Mutex::new(Vec::new()),
        }
    }

    /// Fetcher failing every download with a network error.
    pub fn failing() -> Self {
        Self {
            body: None,
            urls: Mutex::new(Vec::new()),
            destinations: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        lock(&self.urls).clone()
    }

    pub fn destinations(&self) -> Vec<PathBuf> {
        lock(&self.destinations).clone()
    }
}

#[async_trait]
impl ArchiveFetcher for StaticFetcher {
    async fn fetch(&self, url: &str, dest: &Path, observer: &dyn ProgressObserver) -> Result<u64> {
        lock(&self.urls).push(url.to_string());
        lock(&self.destinations).push(dest.to_path_buf());

        let Some(body) = &self.body else {
            observer.on_finish();
            return Err(StattrackError::network("download", "static fetcher configured to fail"));
        };
        tokio::fs::write(dest, body)
            .await
            .map_err(|e| StattrackError::filesystem("write archive", dest, e))?;
        let len = body.len() as u64;
        observer.on_progress(DownloadProgress::new(len, len));
        observer.on_finish();
        Ok(len)
    }
}

/// Observer keeping every progress event.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DownloadProgress>>,
    finished: AtomicBool,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<DownloadProgress> {
        lock(&self.events).clone()
    }

    pub fn finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_progress(&self, progress: DownloadProgress) {
        lock(&self.events).push(progress);
    }

    fn on_finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}
