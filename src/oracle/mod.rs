//! Remote version oracle.
//!
//! Asks the release-listing endpoint for the newest published tag. The lookup
//! is single-shot: no retry, bounded by the network timeout, and every failure
//! collapses to an empty string so callers can treat "unknown" uniformly.
//! A successful lookup records the current time as
//! `internal.cli_version_last_accessed`, which drives the update-check
//! cooldown in [`crate::update`].

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::constants::ORACLE_USER_AGENT;
use crate::core::{Result, StattrackError};
use crate::net::build_client;
use crate::settings::{self, NetworkSettings, SettingsProvider};

/// Source of the latest published CLI version.
#[async_trait]
pub trait VersionOracle: Send + Sync {
    /// Latest release tag, or an empty string when it cannot be determined.
    async fn fetch_latest_version(&self) -> String;
}

/// Oracle backed by the GitHub releases API.
pub struct GithubReleaseOracle {
    releases_url: String,
    timeout: Duration,
    settings: Arc<dyn SettingsProvider>,
}

impl GithubReleaseOracle {
    pub fn new(
        releases_url: impl Into<String>,
        timeout: Duration,
        settings: Arc<dyn SettingsProvider>,
    ) -> Self {
        Self {
            releases_url: releases_url.into(),
            timeout,
            settings,
        }
    }

    async fn fetch(&self) -> Result<String> {
        let network = NetworkSettings::load(self.settings.as_ref()).await;
        let client = build_client(&network, self.timeout, ORACLE_USER_AGENT)?;

        debug!("Fetching latest stattrack version from {}", self.releases_url);
        let response = client
            .get(&self.releases_url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| StattrackError::network("fetch releases", e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(StattrackError::network("fetch releases", format!("HTTP {status}")));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| StattrackError::network("parse releases", e))?;
        let tag = extract_tag_name(&body).ok_or_else(|| {
            StattrackError::network("parse releases", "response has no tag_name")
        })?;

        if let Err(e) =
            settings::record_checked(self.settings.as_ref(), chrono::Utc::now().timestamp()).await
        {
            warn!("Failed to record version check time: {}", e);
        }
        Ok(tag)
    }
}

#[async_trait]
impl VersionOracle for GithubReleaseOracle {
    async fn fetch_latest_version(&self) -> String {
        match self.fetch().await {
            Ok(tag) => {
                info!("Latest stattrack version is {}", tag);
                tag
            }
            Err(e) => {
                warn!("Unable to fetch latest stattrack version: {}", e);
                String::new()
            }
        }
    }
}

/// `tag_name` of a single release object, or of the first entry of a release
/// list.
pub fn extract_tag_name(body: &Value) -> Option<String> {
    let release = match body {
        Value::Array(releases) => releases.first()?,
        other => other,
    };
    release
        .get("tag_name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemorySettings;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn oracle(server: &MockServer, settings: Arc<MemorySettings>) -> GithubReleaseOracle {
        GithubReleaseOracle::new(
            format!("{}/repos/o/r/releases/latest", server.uri()),
            Duration::from_secs(5),
            settings,
        )
    }

    #[test]
    fn test_extract_tag_name_shapes() {
        assert_eq!(extract_tag_name(&json!({"tag_name": "v1.2.3"})).as_deref(), Some("v1.2.3"));
        assert_eq!(
            extract_tag_name(&json!([{"tag_name": "v2.0.0"}, {"tag_name": "v1.0.0"}])).as_deref(),
            Some("v2.0.0")
        );
        assert_eq!(extract_tag_name(&json!([])), None);
        assert_eq!(extract_tag_name(&json!({"name": "x"})), None);
        assert_eq!(extract_tag_name(&json!({"tag_name": 5})), None);
    }

    #[tokio::test]
    async fn test_fetch_success_records_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/releases/latest"))
            .and(header("user-agent", ORACLE_USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tag_name": "v1.90.0"})))
            .expect(1)
            .mount(&server)
            .await;

        let settings = Arc::new(MemorySettings::new());
        let before = chrono::Utc::now().timestamp();
        let tag = oracle(&server, settings.clone()).fetch_latest_version().await;

        assert_eq!(tag, "v1.90.0");
        let recorded = settings::last_checked(settings.as_ref()).await.unwrap();
        assert!(recorded >= before);
    }

    /// Store that can be read but never written.
    struct ReadOnlySettings;

    #[async_trait]
    impl SettingsProvider for ReadOnlySettings {
        async fn get(&self, _namespace: &str, _key: &str, _internal: bool) -> Result<Option<String>> {
            Ok(None)
        }

        async fn set(&self, _namespace: &str, key: &str, _value: &str, _internal: bool) -> Result<()> {
            Err(StattrackError::SettingsError {
                message: format!("cannot write {key}: read-only store"),
            })
        }
    }

    #[tokio::test]
    async fn test_unwritable_settings_still_return_tag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/releases/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tag_name": "v1.0.0"})))
            .expect(1)
            .mount(&server)
            .await;

        let oracle = GithubReleaseOracle::new(
            format!("{}/repos/o/r/releases/latest", server.uri()),
            Duration::from_secs(5),
            Arc::new(ReadOnlySettings),
        );
        assert_eq!(oracle.fetch_latest_version().await, "v1.0.0");
    }

    #[tokio::test]
    async fn test_non_200_returns_empty_and_keeps_timestamp() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let settings = Arc::new(MemorySettings::new());
        let tag = oracle(&server, settings.clone()).fetch_latest_version().await;

        assert_eq!(tag, "");
        assert_eq!(settings::last_checked(settings.as_ref()).await, None);
    }

    #[tokio::test]
    async fn test_invalid_json_returns_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let settings = Arc::new(MemorySettings::new());
        assert_eq!(oracle(&server, settings).fetch_latest_version().await, "");
    }

    #[tokio::test]
    async fn test_unreachable_server_returns_empty() {
        let oracle = GithubReleaseOracle::new(
            "http://127.0.0.1:9/releases/latest",
            Duration::from_secs(2),
            Arc::new(MemorySettings::new()),
        );
        assert_eq!(oracle.fetch_latest_version().await, "");
    }
}
