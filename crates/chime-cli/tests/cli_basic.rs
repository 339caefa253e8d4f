//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway home directory and verify
//! outputs.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Run a CLI command with `home` as the home directory.
fn run_cli(home: &TempDir, args: &[&str], stdin: &str) -> (i32, String, String) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_chime"))
        .args(args)
        .env("HOME", home.path())
        .env_remove("CHIME_ENV")
        .env_remove("CHIME_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("CLI did not finish");

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

#[test]
fn test_config_defaults() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "get", "long_break_interval"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "4");

    let (code, stdout, _) = run_cli(&home, &["config", "get", "focus.duration_min"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn test_config_set_persists() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "set", "focus.duration_min", "50"], "");
    assert_eq!(code, 0);

    let (code, stdout, _) = run_cli(&home, &["config", "get", "focus.duration_min"], "");
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "50");
}

#[test]
fn test_config_unknown_key_fails() {
    let home = TempDir::new().unwrap();
    let (code, _, stderr) = run_cli(&home, &["config", "get", "no.such.key"], "");
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_list_is_json() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["config", "list"], "");
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(parsed["short_break"]["duration_min"], 5);
}

#[test]
fn test_stats_start_empty() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["stats", "today"], "");
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(parsed["sessions"], 0);
}

#[test]
fn test_run_prints_events_as_json_lines() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(
        &home,
        &["run", "--json", "--no-history", "--tick-ms", "60000"],
        "s\np\nr\nt\nq\n",
    );
    assert_eq!(code, 0);

    let kinds: Vec<String> = stdout
        .lines()
        .map(|line| {
            let event: serde_json::Value = serde_json::from_str(line).expect("valid JSON line");
            event["type"].as_str().unwrap().to_string()
        })
        .filter(|kind| kind != "tick")
        .collect();
    assert_eq!(kinds, vec!["start", "pause", "resume", "stop"]);
}

#[test]
fn test_run_reload_applies_saved_config() {
    let home = TempDir::new().unwrap();
    let (code, _, _) = run_cli(&home, &["config", "set", "long_break_interval", "2"], "");
    assert_eq!(code, 0);

    let (code, stdout, _) = run_cli(
        &home,
        &["run", "--json", "--no-history", "--tick-ms", "60000"],
        "c\nq\n",
    );
    assert_eq!(code, 0);

    let kinds: Vec<String> = stdout
        .lines()
        .map(|line| {
            let event: serde_json::Value = serde_json::from_str(line).expect("valid JSON line");
            event["type"].as_str().unwrap().to_string()
        })
        .filter(|kind| kind != "tick")
        .collect();
    assert_eq!(kinds, vec!["change"]);
}

#[test]
fn test_run_exits_on_end_of_input() {
    let home = TempDir::new().unwrap();
    let (code, stdout, _) = run_cli(&home, &["run", "--no-history"], "");
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
}
