//! Integration tests for the `muxlink` CLI binary.
//!
//! Argument parsing, help output and config errors run without any
//! appliance. The end-to-end cases point the binary at a wiremock server
//! standing in for `/mnc/secure_api.php`.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `muxlink` binary with env isolation.
///
/// Clears all `MUXLINK_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn muxlink_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("muxlink");
    cmd.env("HOME", "/tmp/muxlink-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/muxlink-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("MUXLINK_PROFILE")
        .env_remove("MUXLINK_HOST")
        .env_remove("MUXLINK_USERNAME")
        .env_remove("MUXLINK_SYSTEM_ID")
        .env_remove("MUXLINK_OUTPUT")
        .env_remove("MUXLINK_TIMEOUT")
        .env_remove("MUXLINK_PASSWORD");
    cmd
}

/// A `muxlink` command aimed at `host` with a password from the env.
fn appliance_cmd(host: &str) -> assert_cmd::Command {
    let mut cmd = muxlink_cmd();
    cmd.env("MUXLINK_HOST", host)
        .env("MUXLINK_PASSWORD", "admin")
        .args(["--timeout", "5"]);
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn reply(cmd: &str, status: &str, data: serde_json::Value) -> serde_json::Value {
    json!({
        "p_targetId": 0,
        "p_cmd": cmd,
        "p_rspStatus": status,
        "p_data": data,
    })
}

async fn appliance() -> MockServer {
    let server = MockServer::start().await;
    let devices = json!([
        { "mac": "00-11-22-33-44-55", "customName": "Desk", "modelName": "500778-TX" },
        { "mac": "00-11-22-33-44-66", "customName": "Wall", "modelName": "500778-RX",
          "connected Mac": "00-11-22-33-44-55" },
    ]);
    Mock::given(method("POST"))
        .and(path("/mnc/secure_api.php"))
        .and(body_partial_json(json!({ "p_cmd": "get_devices" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply("get_devices", "SUCCESS", devices)),
        )
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = muxlink_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    muxlink_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Muxlab")
            .and(predicate::str::contains("connect"))
            .and(predicate::str::contains("preset"))
            .and(predicate::str::contains("devices")),
    );
}

#[test]
fn test_version_flag() {
    muxlink_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("muxlink"));
}

#[test]
fn test_completions_bash() {
    muxlink_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_subcommand() {
    let output = muxlink_cmd().arg("teleport").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized subcommand"),
        "Expected clap error in output:\n{text}"
    );
}

#[test]
fn test_invalid_toggle_value() {
    let output = muxlink_cmd()
        .args(["device", "60fps", "Desk", "maybe"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_devices_without_config() {
    let output = muxlink_cmd().arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("config init"),
        "Expected setup hint in output:\n{text}"
    );
}

#[test]
fn test_missing_explicit_profile() {
    let output = muxlink_cmd()
        .args(["--profile", "studio", "devices"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("studio"), "Expected profile name in output:\n{text}");
}

#[test]
fn test_config_path() {
    muxlink_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_with_host_flag() {
    appliance_cmd("10.0.0.5")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("10.0.0.5")
                .and(predicate::str::contains("admin"))
                .and(predicate::str::contains("env:MUXLINK_PASSWORD")),
        );
}

#[test]
fn test_config_written_by_set_is_read_back() {
    let dir = tempfile::tempdir().unwrap();
    let config_dir = dir.path().join("muxlink");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "default_profile = \"lab\"\n\n[profiles.lab]\nhost = \"192.168.168.50\"\n",
    )
    .unwrap();

    let isolated = || {
        let mut cmd = muxlink_cmd();
        cmd.env("HOME", dir.path())
            .env("XDG_CONFIG_HOME", dir.path())
            .env("MUXLINK_PASSWORD", "admin");
        cmd
    };

    isolated()
        .args(["config", "set", "system_id", "7"])
        .assert()
        .success();

    isolated()
        .args(["config", "show", "-o", "json"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"system_id\": 7")
                .and(predicate::str::contains("192.168.168.50")),
        );
}

#[test]
fn test_invalid_preset_rejected_before_network() {
    // Nothing listens on this host; validation must fail first.
    let output = appliance_cmd("127.0.0.1:1")
        .args(["preset", "apply", "seven"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("preset"), "Expected preset error:\n{text}");
}

// ── Against a mock appliance ────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_json_lists_every_endpoint() {
    let server = appliance().await;

    let output = appliance_cmd(&server.uri())
        .args(["devices", "-o", "json-compact"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let macs: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["mac"].as_str().unwrap())
        .collect();
    assert_eq!(macs, ["00-11-22-33-44-55", "00-11-22-33-44-66"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_devices_choices_for_receivers() {
    let server = appliance().await;

    appliance_cmd(&server.uri())
        .args(["devices", "--role", "rx", "--choices", "-o", "plain"])
        .assert()
        .success()
        .stdout("0\n00-11-22-33-44-66\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_resolves_names() {
    let server = appliance().await;
    Mock::given(method("POST"))
        .and(path("/mnc/secure_api.php"))
        .and(body_partial_json(json!({
            "p_cmd": "connection",
            "p_data": [{ "macRx": "00-11-22-33-44-66", "macTx": "00-11-22-33-44-55" }],
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply("connection", "SUCCESS", json!([]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    appliance_cmd(&server.uri())
        .args(["connect", "--tx", "Desk", "--rx", "wall"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Connection successful: 00-11-22-33-44-55:00-11-22-33-44-66",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disconnect_sends_no_transmitter() {
    let server = appliance().await;
    Mock::given(method("POST"))
        .and(path("/mnc/secure_api.php"))
        .and(body_partial_json(json!({
            "p_cmd": "connection",
            "p_data": [{ "macRx": "00-11-22-33-44-66", "macTx": "00-00-00-00-00-00" }],
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply("connection", "SUCCESS", json!([]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    appliance_cmd(&server.uri())
        .args(["disconnect", "--rx", "Wall"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_reboot_exits_with_failure() {
    let server = appliance().await;
    Mock::given(method("POST"))
        .and(path("/mnc/secure_api.php"))
        .and(body_partial_json(json!({ "p_cmd": "reboot_devices" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply("reboot_devices", "FAILED", json!([]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let output = appliance_cmd(&server.uri())
        .args(["reboot", "Desk"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("Reboot failed: 00-11-22-33-44-55"),
        "Expected rejection message:\n{text}"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_device_name_is_not_found() {
    let server = appliance().await;

    let output = appliance_cmd(&server.uri())
        .args(["reboot", "Lobby"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unauthorized_is_an_auth_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mnc/secure_api.php"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = appliance_cmd(&server.uri()).arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[test]
fn test_unreachable_appliance_is_a_connection_failure() {
    let output = appliance_cmd("127.0.0.1:1").arg("devices").output().unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}
