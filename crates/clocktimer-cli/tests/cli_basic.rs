//! Basic CLI E2E tests.
//!
//! Each test points the binary at its own data directory.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (exit code, stdout, stderr).
fn run_cli(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_clocktimer-cli"))
        .env("CLOCKTIMER_DATA_DIR", dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

#[test]
fn test_format_phrases() {
    let dir = tempfile::tempdir().unwrap();
    let cases = [
        ("45s", "45 seconds remaining"),
        ("1h", "1 hour 0 seconds remaining"),
        ("2h5m", "2 hours 5 minutes 0 seconds remaining"),
        ("61", "1 minute 1 second remaining"),
    ];
    for (input, expected) in cases {
        let (code, stdout, _) = run_cli(dir.path(), &["format", input]);
        assert_eq!(code, 0, "format {input} failed");
        assert_eq!(stdout.trim(), expected);
    }
}

#[test]
fn test_format_clock() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["format", "--clock", "1h2m3s"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "1:02:03");
}

#[test]
fn test_format_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["format", "soon"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_roundtrip() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "notifications.in_use"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "true");

    let (code, _, _) = run_cli(dir.path(), &["config", "set", "phrases.seconds", "{n} sec"]);
    assert_eq!(code, 0);
    let (_, stdout, _) = run_cli(dir.path(), &["format", "5s"]);
    assert_eq!(stdout.trim(), "5 sec remaining");

    let (code, stdout, _) = run_cli(dir.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["phrases"]["seconds"], "{n} sec");

    let (code, _, _) = run_cli(dir.path(), &["config", "get", "phrases.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_timer_lifecycle() {
    let dir = tempfile::tempdir().unwrap();

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "list"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "no timers");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "add", "5m", "--label", "Eggs"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("#1"));
    assert!(stdout.contains("restart"));
    assert!(stdout.contains("5:00"));

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "start", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("running"));
    assert!(stdout.contains("[in use] Eggs: 5 minutes 0 seconds remaining"));

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "next", "--json"]);
    assert_eq!(code, 0);
    let next: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(next["id"], 1);
    assert_eq!(next["needs_update_before_expiry"], true);

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "stop", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("stopped"));
    assert!(stdout.contains("[in use] Timer stopped"));

    let (_, stdout, _) = run_cli(dir.path(), &["timer", "next"]);
    assert_eq!(stdout.trim(), "no running timer");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "list", "--json"]);
    assert_eq!(code, 0);
    let rows: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(rows[0]["state"], "stopped");
    assert_eq!(rows[0]["label"], "Eggs");

    let (code, stdout, _) = run_cli(dir.path(), &["timer", "delete", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("timer 1 removed"));

    let (_, stdout, _) = run_cli(dir.path(), &["timer", "list"]);
    assert_eq!(stdout.trim(), "no timers");
}

#[test]
fn test_timer_ids_keep_counting() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["timer", "add", "1m"]);
    let (_, stdout, _) = run_cli(dir.path(), &["timer", "add", "2m"]);
    assert!(stdout.contains("#2"));
}

#[test]
fn test_timer_unknown_id_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["timer", "start", "42"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no timer with id 42"));
}

#[test]
fn test_timer_add_rejects_zero_length() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["timer", "add", "0"]);
    assert_eq!(code, 1);
}
