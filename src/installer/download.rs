//! Streaming archive download.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::constants::DOWNLOAD_USER_AGENT;
use crate::core::{Result, StattrackError};
use crate::net::build_client;
use crate::settings::{NetworkSettings, SettingsProvider};
use crate::utils::fs::remove_file_best_effort;
use crate::utils::progress::{DownloadProgress, ProgressObserver, ProgressThrottle};

/// Downloads a release archive to a local file.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Download `url` into `dest`, reporting progress to `observer`.
    ///
    /// On failure no partial file is left at `dest`. Returns the number of
    /// bytes written.
    async fn fetch(&self, url: &str, dest: &Path, observer: &dyn ProgressObserver) -> Result<u64>;
}

/// HTTP fetcher honoring the proxy and TLS settings current at call time.
pub struct HttpFetcher {
    timeout: Duration,
    progress_interval: Duration,
    settings: Arc<dyn SettingsProvider>,
}

impl HttpFetcher {
    pub fn new(
        timeout: Duration,
        progress_interval: Duration,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            timeout,
            progress_interval,
            settings,
        }
    }

    async fn stream_to(
        &self,
        url: &str,
        dest: &Path,
        observer: &dyn ProgressObserver,
    ) -> Result<u64> {
        let network = NetworkSettings::load(self.settings.as_ref()).await;
        if let Some(proxy) = &network.proxy {
            info!("Using proxy {}", proxy);
        }
        let client = build_client(&network, self.timeout, DOWNLOAD_USER_AGENT)?;

        info!("Downloading {}", url);
        let mut response = client
            .get(url)
            .send()
            .await
            .map_err(|e| StattrackError::network("download", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StattrackError::network("download", format!("HTTP {status} from {url}")));
        }

        let total = response.content_length().filter(|len| *len > 0);
        match total {
            Some(total) => debug!("Total download size: {} bytes", total),
            None => debug!("Content-Length missing, progress will not be reported"),
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| StattrackError::filesystem("create archive", dest, e))?;
        let mut throttle = ProgressThrottle::new(self.progress_interval);
        let mut downloaded: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| StattrackError::network("download", e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| StattrackError::filesystem("write archive", dest, e))?;
            downloaded += chunk.len() as u64;

            if let Some(total) = total {
                if throttle.ready() {
                    observer.on_progress(DownloadProgress::new(downloaded, total));
                }
            }
        }

        file.flush()
            .await
            .map_err(|e| StattrackError::filesystem("write archive", dest, e))?;
        debug!("Saved {} bytes to {}", downloaded, dest.display());
        Ok(downloaded)
    }
}

#[async_trait]
impl ArchiveFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path, observer: &dyn ProgressObserver) -> Result<u64> {
        let result = self.stream_to(url, dest, observer).await;
        observer.on_finish();
        if result.is_err() {
            remove_file_best_effort(dest).await;
        }
        result
    }
}
