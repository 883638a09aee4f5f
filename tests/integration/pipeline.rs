//! Check-and-install cycles against a mock release server, using the real
//! HTTP oracle, fetcher and subprocess probe.

#![cfg(unix)]

use serde_json::json;
use stattrack_deps::config::ManagerConfig;
use stattrack_deps::manager::{CliManager, InstallOutcome};
use stattrack_deps::platform::{Arch, Os, PlatformSignature};
use stattrack_deps::settings::{self, MemorySettings, SettingsProvider};
use stattrack_deps::test_utils::{RecordingReporter, ZipFixture, write_executable};
use stattrack_deps::update::UpdateDecision;
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{TestEnv, read, release_path, transient_files, version_script};

const LATEST_PATH: &str = "/repos/ymohit1603/StatTrack-cli/releases/latest";

struct Setup {
    env: TestEnv,
    server: MockServer,
    settings: Arc<MemorySettings>,
    reporter: Arc<RecordingReporter>,
}

impl Setup {
    async fn new() -> Self {
        stattrack_deps::test_utils::init_test_logging(None);
        Self {
            env: TestEnv::new(),
            server: MockServer::start().await,
            settings: Arc::new(MemorySettings::new()),
            reporter: Arc::new(RecordingReporter::default()),
        }
    }

    fn config(&self) -> ManagerConfig {
        ManagerConfig {
            network_timeout_secs: 5,
            ..self.env.config_for_server(&self.server.uri())
        }
    }

    async fn manager(&self, signature: PlatformSignature, kernel: &str) -> CliManager {
        CliManager::builder(self.config())
            .settings(self.settings.clone())
            .reporter(self.reporter.clone())
            .platform(signature)
            .kernel_release(kernel)
            .search_path(self.env.bin_dir.clone().into_os_string())
            .build()
            .await
            .expect("build manager")
    }

    async fn serve_archive(&self, tag: &str, signature: &PlatformSignature, version: &str) {
        let archive = ZipFixture::new()
            .file(&signature.binary_file_name("stattrack"), &version_script(version))
            .to_bytes();
        Mock::given(method("GET"))
            .and(path(release_path(tag, signature)))
            .and(header("user-agent", "StatTrack-VSCode-Extension"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
            .mount(&self.server)
            .await;
    }

    async fn serve_latest(&self, tag: &str, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path(LATEST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tag_name": tag})))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }
}

fn linux_amd64() -> PlatformSignature {
    PlatformSignature::from_raw("linux", "x64")
}

#[tokio::test]
async fn test_fresh_linux_install() {
    let setup = Setup::new().await;
    setup.serve_archive("v1.0.0", &linux_amd64(), "v1.0.0").await;
    setup.serve_latest("v1.0.0", 0).await;

    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::Installed);

    let resources = &setup.env.resources;
    let binary = resources.join("stattrack-linux-amd64");
    assert_eq!(read(&binary), version_script("v1.0.0"));
    assert_eq!(
        std::fs::read_link(resources.join("stattrack")).unwrap(),
        std::path::Path::new("stattrack-linux-amd64")
    );
    assert!(transient_files(resources).is_empty());
    assert!(manager.is_cli_installed());
    assert_eq!(setup.reporter.count(), 0);
}

#[tokio::test]
async fn test_current_install_is_checked_once_per_cooldown() {
    let setup = Setup::new().await;
    setup.serve_latest("v1.0.0", 1).await;
    std::fs::create_dir_all(&setup.env.resources).unwrap();
    write_executable(&setup.env.resources.join("stattrack-linux-amd64"), &version_script("v1.0.0"));

    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::AlreadyCurrent);
    assert!(settings::last_checked(setup.settings.as_ref()).await.is_some());

    // a new manager sharing the settings store stays within the cooldown
    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check().await, UpdateDecision::UpToDate);
}

#[tokio::test]
async fn test_outdated_install_is_replaced() {
    let setup = Setup::new().await;
    setup.serve_latest("v1.0.0", 1).await;
    setup.serve_archive("v1.0.0", &linux_amd64(), "v1.0.0").await;
    std::fs::create_dir_all(&setup.env.resources).unwrap();
    let binary = setup.env.resources.join("stattrack-linux-amd64");
    write_executable(&binary, &version_script("v0.9.0"));

    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::Installed);
    assert_eq!(read(&binary), version_script("v1.0.0"));
}

#[tokio::test]
async fn test_corrupt_archive_restores_previous_binary() {
    let setup = Setup::new().await;
    setup.serve_latest("v1.0.0", 1).await;
    Mock::given(method("GET"))
        .and(path(release_path("v1.0.0", &linux_amd64())))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not a zip".to_vec()))
        .mount(&setup.server)
        .await;
    std::fs::create_dir_all(&setup.env.resources).unwrap();
    let binary = setup.env.resources.join("stattrack-linux-amd64");
    write_executable(&binary, &version_script("v0.9.0"));

    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::Failed);

    assert_eq!(read(&binary), version_script("v0.9.0"));
    assert!(transient_files(&setup.env.resources).is_empty());
    assert!(manager.is_cli_installed());
}

#[tokio::test]
async fn test_release_server_error_fails_cleanly() {
    let setup = Setup::new().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&setup.server)
        .await;

    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::Failed);
    assert!(!manager.is_cli_installed());
    assert!(transient_files(&setup.env.resources).is_empty());
}

#[tokio::test]
async fn test_unknown_latest_version_triggers_reinstall() {
    let setup = Setup::new().await;
    Mock::given(method("GET"))
        .and(path(LATEST_PATH))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&setup.server)
        .await;
    setup.serve_archive("v1.0.0", &linux_amd64(), "v1.0.0").await;
    std::fs::create_dir_all(&setup.env.resources).unwrap();
    write_executable(&setup.env.resources.join("stattrack-linux-amd64"), &version_script("v1.0.0"));

    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::Installed);
    assert_eq!(settings::last_checked(setup.settings.as_ref()).await, None);
}

#[tokio::test]
async fn test_legacy_darwin_installs_pinned_release() {
    let setup = Setup::new().await;
    let darwin = PlatformSignature::from_raw("darwin", "x64");
    setup.serve_latest("v1.0.0", 0).await;
    setup.serve_archive("v1.39.1-alpha.1", &darwin, "v1.39.1-alpha.1").await;
    std::fs::create_dir_all(&setup.env.resources).unwrap();
    let binary = setup.env.resources.join("stattrack-darwin-amd64");
    write_executable(&binary, &version_script("v1.0.0"));

    // cooldown is active, but the legacy mismatch wins
    let now = chrono::Utc::now().timestamp().to_string();
    setup.settings.set("internal", "cli_version_last_accessed", &now, true).await.unwrap();

    let manager = setup.manager(darwin, "16.7.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::Installed);
    assert_eq!(read(&binary), version_script("v1.39.1-alpha.1"));

    // now pinned and current
    assert_eq!(manager.check().await, UpdateDecision::UpToDate);
}

#[tokio::test]
async fn test_local_build_is_never_replaced() {
    let setup = Setup::new().await;
    setup.serve_latest("v9.9.9", 0).await;
    std::fs::create_dir_all(&setup.env.resources).unwrap();
    write_executable(
        &setup.env.resources.join("stattrack-linux-amd64"),
        &version_script("<local-build>"),
    );

    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::AlreadyCurrent);
}

#[tokio::test]
async fn test_unsupported_platform_is_reported_and_attempted() {
    let setup = Setup::new().await;
    let riscv = PlatformSignature::new(Os::Linux, Arch::Other("riscv64".to_string()));
    setup.serve_archive("v1.0.0", &riscv, "v1.0.0").await;

    let manager = setup.manager(riscv, "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::Installed);
    assert_eq!(setup.reporter.count(), 1);
    assert_eq!(setup.reporter.reported()[0].label(), "linux-riscv64");
}

#[tokio::test]
async fn test_invalid_proxy_setting_fails_download() {
    let setup = Setup::new().await;
    setup.serve_archive("v1.0.0", &linux_amd64(), "v1.0.0").await;
    setup.settings.set("settings", "proxy", "http://[invalid", false).await.unwrap();

    let manager = setup.manager(linux_amd64(), "6.1.0").await;
    assert_eq!(manager.check_and_install().await, InstallOutcome::Failed);

    // settings are read per request, so fixing the proxy fixes the next cycle
    setup.settings.set("settings", "proxy", "", false).await.unwrap();
    assert_eq!(manager.check_and_install().await, InstallOutcome::Installed);
}
