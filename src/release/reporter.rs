//! Missing-platform reports.
//!
//! When a host asks for an `{os}-{arch}` pair with no published build, the
//! release resolver tells the StatTrack API about it. The report is fire and
//! forget: it runs on a detached task, its result is only logged at debug
//! level, and it can never delay or fail an install.

use std::sync::Arc;
use tracing::debug;

use crate::constants::DOWNLOAD_USER_AGENT;
use crate::net::build_client;
use crate::platform::PlatformSignature;
use crate::settings::{NetworkSettings, SettingsProvider};

/// Receives notice of hosts that have no published build.
pub trait PlatformReporter: Send + Sync {
    /// Report `signature`. Must return immediately.
    fn report_missing(&self, signature: &PlatformSignature);
}

/// Reporter sending `GET {endpoint}?osname=..&architecture=..&plugin=..`.
pub struct HttpPlatformReporter {
    endpoint: String,
    plugin: String,
    timeout: std::time::Duration,
    settings: Arc<dyn SettingsProvider>,
}

impl HttpPlatformReporter {
    pub fn new(
        endpoint: impl Into<String>,
        plugin: impl Into<String>,
        timeout: std::time::Duration,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            plugin: plugin.into(),
            timeout,
            settings,
        }
    }

    /// Full report URL for `signature`, or `None` if the endpoint is invalid.
    pub fn report_url(&self, signature: &PlatformSignature) -> Option<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.endpoint).ok()?;
        url.query_pairs_mut()
            .append_pair("osname", signature.os.as_str())
            .append_pair("architecture", signature.arch.as_str())
            .append_pair("plugin", &self.plugin);
        Some(url)
    }
}

impl PlatformReporter for HttpPlatformReporter {
    fn report_missing(&self, signature: &PlatformSignature) {
        let Some(url) = self.report_url(signature) else {
            debug!("Invalid missing-platform endpoint '{}', not reporting", self.endpoint);
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("No async runtime available, not reporting missing platform {}", signature);
            return;
        };

        let settings = Arc::clone(&self.settings);
        let timeout = self.timeout;
        runtime.spawn(async move {
            let network = NetworkSettings::load(settings.as_ref()).await;
            let client = match build_client(&network, timeout, DOWNLOAD_USER_AGENT) {
                Ok(client) => client,
                Err(e) => {
                    debug!("Missing-platform report skipped: {}", e);
                    return;
                }
            };
            match client.get(url).send().await {
                Ok(response) => debug!("Missing-platform report sent: HTTP {}", response.status()),
                Err(e) => debug!("Missing-platform report failed: {}", e),
            }
        });
    }
}
