//! End-to-end tests of the `arbwatch` binary.

use std::path::Path;

use arbwatch::testkit::config::VALID_TOML;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A working directory holding `config.toml`, isolated from any `.env`.
fn workspace(config: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("config.toml"), config).unwrap();
    dir
}

fn arbwatch(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("arbwatch").unwrap();
    cmd.current_dir(dir)
        .env_remove("ARBWATCH_CONFIG")
        .env_remove("ARBWATCH_API_TOKEN")
        .env_remove("WALLET_PRIVATE_KEY")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn help_lists_commands() {
    let dir = workspace(VALID_TOML);
    arbwatch(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("execute"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn validate_accepts_default_config_path() {
    let dir = workspace(VALID_TOML);
    arbwatch(dir.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn config_env_var_overrides_default_path() {
    let dir = workspace("not = [valid");
    std::fs::write(dir.path().join("alt.toml"), VALID_TOML).unwrap();
    arbwatch(dir.path())
        .env("ARBWATCH_CONFIG", dir.path().join("alt.toml"))
        .args(["config", "validate"])
        .assert()
        .success();
}

#[test]
fn validate_rejects_bad_field_with_nonzero_exit() {
    let dir = workspace("[stream]\nurl = \"https://engine.test/ws\"\n");
    arbwatch(dir.path())
        .args(["config", "validate"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("stream.url"));
}

#[test]
fn missing_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    arbwatch(dir.path())
        .args(["config", "validate", "--config", "nowhere.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn json_mode_emits_typed_lines() {
    let dir = workspace(VALID_TOML);
    let output = arbwatch(dir.path())
        .args(["--json", "config", "validate"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let first: serde_json::Value = serde_json::from_str(stdout.lines().next().unwrap()).unwrap();
    assert_eq!(first["type"], "success");
    assert_eq!(first["payload"]["message"], "Configuration is valid");
}

#[test]
fn show_reports_secret_presence_only() {
    let dir = workspace(VALID_TOML);
    arbwatch(dir.path())
        .env("ARBWATCH_API_TOKEN", "super-secret-token")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ARBWATCH_API_TOKEN"))
        .stdout(predicate::str::contains("super-secret-token").not());
}

#[test]
fn execute_without_endpoint_fails_before_network() {
    let dir = workspace("[stream]\nurl = \"wss://engine.test/ws\"\n");
    arbwatch(dir.path())
        .args(["execute", "opp-1", "--size", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("execution.api_url"));
}

#[test]
fn malformed_flag_is_a_usage_error() {
    let dir = workspace(VALID_TOML);
    arbwatch(dir.path())
        .args(["watch", "--min-profit", "lots"])
        .assert()
        .failure()
        .code(2);
}
