//! Shared helpers for the stattrack-deps integration tests.

// Not every helper is used by every test module
#![allow(dead_code)]

use assert_cmd::Command;
use stattrack_deps::config::ManagerConfig;
use stattrack_deps::platform::{self, PlatformSignature};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated workspace: resources dir, empty `PATH` dir and config file.
pub struct TestEnv {
    pub temp: TempDir,
    pub resources: PathBuf,
    pub bin_dir: PathBuf,
    pub config_path: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let resources = temp.path().join("resources");
        let bin_dir = temp.path().join("bin");
        std::fs::create_dir_all(&bin_dir).expect("create bin dir");

        let env = Self {
            config_path: temp.path().join("deps.toml"),
            temp,
            resources,
            bin_dir,
        };
        env.write_config(env.config());
        env
    }

    /// Default configuration rooted in this environment.
    pub fn config(&self) -> ManagerConfig {
        ManagerConfig {
            resources_dir: self.resources.display().to_string(),
            ..ManagerConfig::default()
        }
    }

    /// Configuration whose release endpoints point at `server_uri`.
    pub fn config_for_server(&self, server_uri: &str) -> ManagerConfig {
        ManagerConfig {
            download_host: server_uri.to_string(),
            releases_url: format!("{server_uri}/repos/ymohit1603/StatTrack-cli/releases/latest"),
            missing_platform_url: format!("{server_uri}/api/v1/cli-missing"),
            ..self.config()
        }
    }

    pub fn write_config(&self, config: ManagerConfig) {
        let content = toml::to_string_pretty(&config).expect("serialize config");
        std::fs::write(&self.config_path, content).expect("write config");
    }

    /// `stattrack-deps` with this environment's config, an empty `PATH`
    /// and progress bars disabled.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("stattrack-deps").expect("binary built");
        cmd.env("STATTRACK_DEPS_CONFIG", &self.config_path)
            .env("PATH", &self.bin_dir)
            .env("STATTRACK_NO_PROGRESS", "1")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Versioned binary path for the host running the tests.
    pub fn host_binary(&self) -> PathBuf {
        self.resources.join(host().binary_file_name("stattrack"))
    }
}

pub fn host() -> PlatformSignature {
    platform::identify()
}

/// Release download path for `signature` at `tag`, as served by the mock.
pub fn release_path(tag: &str, signature: &PlatformSignature) -> String {
    format!(
        "/ymohit1603/StatTrack-cli/releases/download/{tag}/{}",
        signature.archive_file_name("stattrack")
    )
}

/// Shell script printing `version` for `--version`.
pub fn version_script(version: &str) -> Vec<u8> {
    format!("#!/bin/sh\necho '{version}'\n").into_bytes()
}

pub fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// Names of leftover archives and backups in `dir`.
pub fn transient_files(dir: &Path) -> Vec<String> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.ends_with(".zip") || n.ends_with(".backup"))
                .collect()
        })
        .unwrap_or_default()
}
