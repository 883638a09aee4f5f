//! File-backed settings as read and written by a running manager.

use serde_json::json;
use stattrack_deps::manager::{CliManager, InstallOutcome};
use stattrack_deps::platform::PlatformSignature;
use stattrack_deps::settings::{self, FileSettings, NetworkSettings, SettingsProvider};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::TestEnv;

fn file_settings(env: &TestEnv) -> FileSettings {
    FileSettings::new(env.resources.join("settings.toml"), env.resources.join("internal.toml"))
}

#[tokio::test]
async fn test_network_settings_follow_file_edits() {
    let env = TestEnv::new();
    let settings = file_settings(&env);
    assert_eq!(NetworkSettings::load(&settings).await, NetworkSettings::default());

    settings.set("settings", "proxy", " http://proxy.local:3128 ", false).await.unwrap();
    settings.set("settings", "no_ssl_verify", "true", false).await.unwrap();

    let loaded = NetworkSettings::load(&settings).await;
    assert_eq!(loaded.proxy.as_deref(), Some("http://proxy.local:3128"));
    assert!(loaded.no_ssl_verify);

    let content = std::fs::read_to_string(env.resources.join("settings.toml")).unwrap();
    assert!(content.contains("[settings]"));
}

#[tokio::test]
async fn test_unparseable_timestamp_is_ignored() {
    let env = TestEnv::new();
    let settings = file_settings(&env);
    settings.set("internal", "cli_version_last_accessed", "yesterday", true).await.unwrap();
    assert_eq!(settings::last_checked(&settings).await, None);

    settings::record_checked(&settings, 1_700_000_000).await.unwrap();
    assert_eq!(settings::last_checked(&settings).await, Some(1_700_000_000));
}

#[tokio::test]
async fn test_corrupt_settings_file_reads_as_unset() {
    let env = TestEnv::new();
    std::fs::create_dir_all(&env.resources).unwrap();
    std::fs::write(env.resources.join("settings.toml"), "this is [not toml").unwrap();

    let settings = file_settings(&env);
    assert_eq!(NetworkSettings::load(&settings).await, NetworkSettings::default());
}

#[cfg(unix)]
#[tokio::test]
async fn test_manager_records_lookup_in_internal_file() {
    use crate::common::version_script;
    use stattrack_deps::test_utils::write_executable;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/ymohit1603/StatTrack-cli/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"tag_name": "v2.0.0"}])))
        .expect(1)
        .mount(&server)
        .await;

    let env = TestEnv::new();
    let signature = PlatformSignature::from_raw("linux", "x64");
    std::fs::create_dir_all(&env.resources).unwrap();
    write_executable(
        &env.resources.join(signature.binary_file_name("stattrack")),
        &version_script("v2.0.0"),
    );

    let config = env.config_for_server(&server.uri());
    let settings = Arc::new(file_settings(&env));
    let manager = CliManager::builder(config)
        .settings(settings.clone())
        .platform(signature)
        .kernel_release("6.1.0")
        .search_path(env.bin_dir.clone().into_os_string())
        .build()
        .await
        .unwrap();

    let before = chrono::Utc::now().timestamp();
    assert_eq!(manager.check_and_install().await, InstallOutcome::AlreadyCurrent);

    let recorded = settings::last_checked(settings.as_ref()).await.unwrap();
    assert!(recorded >= before);

    let internal = std::fs::read_to_string(env.resources.join("internal.toml")).unwrap();
    assert!(internal.contains("cli_version_last_accessed"));
    assert!(!env.resources.join("settings.toml").exists());
}
