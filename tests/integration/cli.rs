use predicates::prelude::*;

use crate::common::{TestEnv, host};

#[test]
fn test_help_lists_commands() {
    let env = TestEnv::new();
    env.cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("platform"))
        .stdout(predicate::str::contains("settings"));
}

#[test]
fn test_platform_shows_host_label_and_url() {
    let env = TestEnv::new();
    let label = host().label();
    env.cmd()
        .args(["--quiet", "platform"])
        .assert()
        .success()
        .stdout(predicate::str::contains(label.clone()))
        .stdout(predicate::str::contains(format!("stattrack-{label}.zip")));
}

#[test]
fn test_locate_path_only() {
    let env = TestEnv::new();
    let expected = env.host_binary().display().to_string();
    env.cmd()
        .args(["--quiet", "locate", "--path-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
    assert!(env.resources.is_dir());
}

#[test]
fn test_locate_reports_missing_binary() {
    let env = TestEnv::new();
    env.cmd()
        .args(["-q", "locate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not present"));
}

#[test]
fn test_resources_dir_flag_overrides_config() {
    let env = TestEnv::new();
    let other = env.temp.path().join("elsewhere");
    env.cmd()
        .args(["-q", "locate", "--path-only", "--resources-dir"])
        .arg(&other)
        .assert()
        .success()
        .stdout(predicate::str::contains(other.display().to_string()));
    assert!(other.is_dir());
}

#[test]
fn test_check_without_binary_needs_install() {
    let env = TestEnv::new();
    env.cmd()
        .args(["-q", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("needs install"));
}

#[test]
fn test_settings_round_trip() {
    let env = TestEnv::new();
    env.cmd()
        .args(["-q", "settings", "set", "settings", "proxy", "http://proxy.local:3128"])
        .assert()
        .success();
    env.cmd()
        .args(["-q", "settings", "get", "settings", "proxy"])
        .assert()
        .success()
        .stdout("http://proxy.local:3128\n");

    assert!(env.resources.join("settings.toml").exists());
}

#[test]
fn test_internal_settings_are_separate() {
    let env = TestEnv::new();
    env.cmd()
        .args(["-q", "settings", "set", "internal", "cli_version_last_accessed", "1700000000", "--internal"])
        .assert()
        .success();

    env.cmd()
        .args(["-q", "settings", "get", "internal", "cli_version_last_accessed"])
        .assert()
        .failure();
    env.cmd()
        .args(["-q", "settings", "get", "internal", "cli_version_last_accessed", "--internal"])
        .assert()
        .success()
        .stdout("1700000000\n");
}

#[test]
fn test_missing_setting_fails() {
    let env = TestEnv::new();
    env.cmd()
        .args(["-q", "settings", "get", "settings", "proxy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}

#[test]
fn test_install_failure_exits_non_zero() {
    let env = TestEnv::new();
    let mut config = env.config_for_server("http://127.0.0.1:9");
    config.network_timeout_secs = 2;
    env.write_config(config);

    env.cmd()
        .args(["-q", "install"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
    assert!(crate::common::transient_files(&env.resources).is_empty());
}

#[test]
fn test_invalid_config_is_reported() {
    let env = TestEnv::new();
    std::fs::write(&env.config_path, "network_timeout_secs = \"soon\"").unwrap();
    env.cmd().args(["-q", "locate"]).assert().failure();
}

#[cfg(unix)]
mod with_server {
    use super::*;
    use crate::common::{release_path, version_script};
    use serde_json::json;
    use stattrack_deps::test_utils::ZipFixture;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn run(cmd: assert_cmd::Command) -> assert_cmd::assert::Assert {
        tokio::task::spawn_blocking(move || {
            let mut cmd = cmd;
            cmd.assert()
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_install_then_up_to_date() {
        let server = MockServer::start().await;
        let signature = host();
        let archive = ZipFixture::new()
            .file(&signature.binary_file_name("stattrack"), &version_script("v1.0.0"))
            .to_bytes();
        Mock::given(method("GET"))
            .and(path(release_path("v1.0.0", &signature)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/ymohit1603/StatTrack-cli/releases/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tag_name": "v1.0.0"})))
            .expect(1)
            .mount(&server)
            .await;

        let env = TestEnv::new();
        env.write_config(env.config_for_server(&server.uri()));

        let mut install = env.cmd();
        install.args(["-q", "install"]);
        run(install)
            .await
            .success()
            .stdout(predicate::str::contains("Installed stattrack"));
        assert!(env.host_binary().exists());
        assert!(env.resources.join("stattrack").exists());

        let mut again = env.cmd();
        again.args(["-q", "install"]);
        run(again).await.success().stdout(predicate::str::contains("up to date"));

        // the oracle recorded its lookup; the cooldown now skips the network
        let mut check = env.cmd();
        check.args(["-q", "check"]);
        run(check).await.success().stdout(predicate::str::contains("up to date"));
    }
}
