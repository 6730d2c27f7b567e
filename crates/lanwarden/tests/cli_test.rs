//! Integration tests for the `lanwarden` CLI binary.
//!
//! These tests validate argument parsing, help output, shell
//! completions, and error handling without a live backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `lanwarden` binary with env isolation.
///
/// Clears all `LANWARDEN_*` env vars and points config directories at
/// a nonexistent path so tests never touch real configuration.
fn lanwarden_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("lanwarden");
    cmd.env("HOME", "/tmp/lanwarden-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/lanwarden-cli-test-nonexistent")
        .env_remove("LANWARDEN_PROFILE")
        .env_remove("LANWARDEN_BACKEND")
        .env_remove("LANWARDEN_USERNAME")
        .env_remove("LANWARDEN_PASSWORD")
        .env_remove("LANWARDEN_OUTPUT")
        .env_remove("LANWARDEN_INSECURE")
        .env_remove("LANWARDEN_TIMEOUT");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = lanwarden_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    lanwarden_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("scanned network devices")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("scan"))
            .and(predicate::str::contains("login")),
    );
}

#[test]
fn test_version_flag() {
    lanwarden_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lanwarden"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    lanwarden_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    lanwarden_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_prints_a_path() {
    lanwarden_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_redacts_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let cfg_dir = dir.path().join("lanwarden");
    std::fs::create_dir_all(&cfg_dir).unwrap();
    std::fs::write(
        cfg_dir.join("config.toml"),
        r#"
default_profile = "lab"

[profiles.lab]
backend = "https://lanwarden.local:8443"
username = "admin"
password = "hunter2"
"#,
    )
    .unwrap();

    lanwarden_cmd()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("<redacted>")
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("lanwarden.local")),
        );
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_devices_list_without_config_fails() {
    let output = lanwarden_cmd().args(["devices", "list"]).output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("config") || text.contains("Configuration") || text.contains("backend"),
        "expected a configuration error, got:\n{text}"
    );
}

#[test]
fn test_scan_plan_requires_interval_and_target() {
    let output = lanwarden_cmd().args(["scan", "plan"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("--interval") || text.contains("required"));
}

#[test]
fn test_unknown_subcommand_fails_usage() {
    let output = lanwarden_cmd().arg("frobnicate").output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}
