//! Key/value settings store used by the dependency manager.
//!
//! The surrounding application owns persisted settings; this crate only needs
//! to read `settings.proxy` and `settings.no_ssl_verify` and to read/write
//! `internal.cli_version_last_accessed`. [`SettingsProvider`] captures that
//! capability. Two implementations ship with the crate:
//!
//! - [`FileSettings`] - TOML files with one table per namespace; internal keys
//!   go to a separate file so user-edited settings never see them.
//! - [`MemorySettings`] - an in-process map, used by tests and embedders that
//!   bring their own persistence.
//!
//! ```toml
//! # settings.toml
//! [settings]
//! proxy = "http://proxy.local:3128"
//! no_ssl_verify = "false"
//! ```

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::constants::{
    INTERNAL_NAMESPACE, LAST_CHECKED_KEY, NO_SSL_VERIFY_KEY, PROXY_KEY, SETTINGS_NAMESPACE,
};
use crate::core::{Result, StattrackError};

/// Asynchronous key/value settings capability.
///
/// `internal` marks values owned by this crate rather than the user; a store
/// may keep them apart from user-visible settings.
#[async_trait]
pub trait SettingsProvider: Send + Sync {
    /// Read a value; `Ok(None)` when unset.
    async fn get(&self, namespace: &str, key: &str, internal: bool) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, namespace: &str, key: &str, value: &str, internal: bool) -> Result<()>;
}

/// Proxy and TLS options, read from the settings store at request time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSettings {
    /// Proxy URL applied to all schemes.
    pub proxy: Option<String>,
    /// Skip TLS certificate verification.
    pub no_ssl_verify: bool,
}

impl NetworkSettings {
    /// Load the current network options. Store failures are treated as unset.
    pub async fn load(settings: &dyn SettingsProvider) -> Self {
        let proxy = settings
            .get(SETTINGS_NAMESPACE, PROXY_KEY, false)
            .await
            .unwrap_or_else(|e| {
                debug!("Could not read proxy setting: {}", e);
                None
            })
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let no_ssl_verify = settings
            .get(SETTINGS_NAMESPACE, NO_SSL_VERIFY_KEY, false)
            .await
            .unwrap_or_else(|e| {
                debug!("Could not read no_ssl_verify setting: {}", e);
                None
            })
            .is_some_and(|value| value.trim() == "true");

        Self { proxy, no_ssl_verify }
    }
}

/// Unix time of the last successful remote version lookup, if recorded and
/// parseable.
pub async fn last_checked(settings: &dyn SettingsProvider) -> Option<i64> {
    match settings.get(INTERNAL_NAMESPACE, LAST_CHECKED_KEY, true).await {
        Ok(Some(value)) => value.trim().parse::<i64>().ok().filter(|ts| *ts > 0),
        Ok(None) => None,
        Err(e) => {
            debug!("Could not read {}: {}", LAST_CHECKED_KEY, e);
            None
        }
    }
}

/// Record `timestamp` as the last successful remote version lookup.
pub async fn record_checked(settings: &dyn SettingsProvider, timestamp: i64) -> Result<()> {
    settings
        .set(INTERNAL_NAMESPACE, LAST_CHECKED_KEY, &timestamp.to_string(), true)
        .await
}

type Tables = BTreeMap<String, BTreeMap<String, String>>;

/// Settings persisted as TOML files.
pub struct FileSettings {
    public_path: PathBuf,
    internal_path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileSettings {
    pub fn new(public_path: impl Into<PathBuf>, internal_path: impl Into<PathBuf>) -> Self {
        Self {
            public_path: public_path.into(),
            internal_path: internal_path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn path_for(&self, internal: bool) -> &Path {
        if internal { &self.internal_path } else { &self.public_path }
    }

    async fn read_tables(path: &Path) -> Result<Tables> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => toml::from_str(&content).map_err(|e| StattrackError::SettingsError {
                message: format!("Invalid settings file {}: {}", path.display(), e),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Tables::new()),
            Err(e) => Err(StattrackError::filesystem("read settings", path, e)),
        }
    }
}

#[async_trait]
impl SettingsProvider for FileSettings {
    async fn get(&self, namespace: &str, key: &str, internal: bool) -> Result<Option<String>> {
        let tables = Self::read_tables(self.path_for(internal)).await?;
        Ok(tables.get(namespace).and_then(|table| table.get(key)).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: &str, internal: bool) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(internal);
        let mut tables = Self::read_tables(path).await?;
        tables
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StattrackError::filesystem("create settings directory", parent, e))?;
        }
        let content = toml::to_string_pretty(&tables)?;
        tokio::fs::write(path, content)
            .await
            .map_err(|e| StattrackError::filesystem("write settings", path, e))?;
        debug!("Stored {}.{} in {}", namespace, key, path.display());
        Ok(())
    }
}

/// In-memory settings store.
#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<(String, String, bool), String>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, convenient for seeding test fixtures.
    pub fn with(self, namespace: &str, key: &str, value: &str, internal: bool) -> Self {
        self.insert(namespace, key, value, internal);
        self
    }

    fn insert(&self, namespace: &str, key: &str, value: &str, internal: bool) {
        let mut values = self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        values.insert((namespace.to_string(), key.to_string(), internal), value.to_string());
    }
}

#[async_trait]
impl SettingsProvider for MemorySettings {
    async fn get(&self, namespace: &str, key: &str, internal: bool) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(values.get(&(namespace.to_string(), key.to_string(), internal)).cloned())
    }

    async fn set(&self, namespace: &str, key: &str, value: &str, internal: bool) -> Result<()> {
        self.insert(namespace, key, value, internal);
        Ok(())
    }
}
