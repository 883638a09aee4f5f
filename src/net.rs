//! HTTP client construction.
//!
//! Every request builds a fresh [`reqwest::Client`] from the settings store so
//! that proxy and TLS changes made mid-session take effect on the next request.

use std::time::Duration;
use tracing::{debug, warn};

use crate::core::{Result, StattrackError};
use crate::settings::NetworkSettings;

/// Build a client honoring `settings`, with a total request `timeout`.
pub fn build_client(
    settings: &NetworkSettings,
    timeout: Duration,
    user_agent: &str,
) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout).user_agent(user_agent);

    if let Some(proxy) = &settings.proxy {
        debug!("Using proxy: {}", proxy);
        let proxy = reqwest::Proxy::all(proxy.as_str()).map_err(|e| {
            StattrackError::ConfigurationError {
                message: format!("Invalid proxy URL '{proxy}': {e}"),
            }
        })?;
        builder = builder.proxy(proxy);
    }

    if settings.no_ssl_verify {
        warn!("TLS certificate verification is disabled (settings.no_ssl_verify)");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(StattrackError::from)
}
