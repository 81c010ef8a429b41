//! CLI integration tests for awake
//!
//! Covers the surface the packaging layer and users depend on:
//! - `awake --version` prints the name and never touches the power backend
//! - malformed arguments are usage errors (exit 2)
//! - a denied backend fails fast with exit 1
//! - zero-length windows exit 0 without acquiring

use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn awake() -> Command {
    let mut cmd = Command::cargo_bin("awake").unwrap();
    cmd.env_remove("AWAKE_CONFIG")
        .env_remove("AWAKE_BACKEND")
        .env_remove("AWAKE_LOG")
        .timeout(Duration::from_secs(30));
    cmd
}

#[test]
fn test_version_contains_name() {
    awake()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains("awake"))
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_short_version_flag() {
    awake().arg("-v").assert().success().stdout(contains("awake"));
}

#[test]
fn test_version_never_acquires() {
    // the none backend would fail any acquisition with exit 1
    awake()
        .env("AWAKE_BACKEND", "none")
        .arg("--version")
        .assert()
        .success();
}

#[test]
fn test_help_mentions_duration_forms() {
    awake()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("DURATION|DATETIME"))
        .stdout(contains("--daemon"));
}

#[test]
fn test_negative_duration_is_usage_error() {
    awake()
        .env("AWAKE_BACKEND", "none")
        .arg("-1")
        .assert()
        .code(2)
        .stderr(contains("Usage"));
}

#[test]
fn test_malformed_duration_is_usage_error() {
    awake()
        .arg("5m1h")
        .assert()
        .code(2)
        .stderr(contains("invalid duration"));
}

#[test]
fn test_malformed_datetime_is_usage_error() {
    awake()
        .arg("2030-13-45T00:00:00")
        .assert()
        .code(2)
        .stderr(contains("invalid datetime"));
}

#[test]
fn test_denied_backend_fails_without_waiting() {
    let started = Instant::now();
    awake()
        .env("AWAKE_BACKEND", "none")
        .arg("2")
        .assert()
        .code(1)
        .stderr(contains("unsupported"));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_denial_reported_once() {
    let output = awake()
        .env("AWAKE_BACKEND", "none")
        .arg("2")
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr.contains("failed to acquire sleep inhibition"));
    assert_eq!(stderr.matches("unsupported").count(), 1, "stderr: {stderr}");
}

#[test]
fn test_huge_duration_is_usage_error() {
    let started = Instant::now();
    awake()
        .env("AWAKE_BACKEND", "none")
        .arg("18446744073709551615")
        .assert()
        .code(2)
        .stderr(contains("invalid duration"));
    awake()
        .env("AWAKE_BACKEND", "none")
        .args(["-d", "36501d"])
        .assert()
        .code(2);
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_zero_duration_exits_without_acquiring() {
    awake()
        .env("AWAKE_BACKEND", "none")
        .arg("0")
        .assert()
        .success();
}

#[test]
fn test_past_datetime_exits_without_acquiring() {
    awake()
        .env("AWAKE_BACKEND", "none")
        .arg("2000-01-01T00:00:00")
        .assert()
        .success();
}

#[test]
fn test_config_file_selects_backend() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("awake.toml");
    fs::write(&path, "backend = \"none\"\nreason = \"integration test\"\n").unwrap();

    awake()
        .arg("--config")
        .arg(&path)
        .arg("10s")
        .assert()
        .code(1)
        .stderr(contains("unsupported"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    awake()
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .arg("10s")
        .assert()
        .code(1)
        .stderr(contains("failed to read config"));
}

#[test]
fn test_unknown_backend_env_fails() {
    awake()
        .env("AWAKE_BACKEND", "iokit")
        .arg("10s")
        .assert()
        .code(1)
        .stderr(contains("unknown backend"));
}
