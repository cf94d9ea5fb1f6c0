//! Basic CLI E2E tests.
//!
//! Each test points the binary at its own data directory.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli(data: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("studysprint").unwrap();
    cmd.env("STUDYSPRINT_DATA_DIR", data.path())
        .env_remove("STUDYSPRINT_SPRINT_MINUTES")
        .env_remove("STUDYSPRINT_BREAK_MINUTES")
        .env_remove("STUDYSPRINT_IDLE_THRESHOLD_MS")
        .env_remove("RUST_LOG");
    cmd
}

fn stats_json(data: &TempDir) -> serde_json::Value {
    let output = cli(data).args(["stats", "--json"]).output().unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn json_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_stats_empty() {
    let data = TempDir::new().unwrap();
    let stats = stats_json(&data);
    assert_eq!(stats["total_sessions"], 0);
    assert_eq!(stats["today_sessions"], 0);
    assert_eq!(stats["streak"], 0);
    assert!(stats["average_rating"].is_null());
}

#[test]
fn test_stats_text_placeholder() {
    let data = TempDir::new().unwrap();
    cli(&data)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Average: –"));
}

#[test]
fn test_run_records_ended_sprint() {
    let data = TempDir::new().unwrap();
    let output = cli(&data)
        .args(["run", "--json"])
        .write_stdin("start Essay intro\nend\nsave 4 good focus\nquit\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let events = json_lines(&output.stdout);
    let kinds: Vec<&str> = events.iter().filter_map(|e| e["type"].as_str()).collect();
    assert_eq!(
        kinds,
        vec!["phase_started", "reflection_requested", "session_recorded"]
    );
    assert_eq!(events[1]["goal"], "Essay intro");
    assert_eq!(events[2]["statistics"]["total_sessions"], 1);

    let stats = stats_json(&data);
    assert_eq!(stats["total_sessions"], 1);
    assert_eq!(stats["streak"], 1);
    assert_eq!(stats["average_rating"], 4.0);

    let sessions = cli(&data).arg("sessions").output().unwrap();
    let sessions: serde_json::Value = serde_json::from_slice(&sessions.stdout).unwrap();
    assert_eq!(sessions[0]["goal"], "Essay intro");
    assert_eq!(sessions[0]["note"], "good focus");
    assert_eq!(sessions[0]["rating"], 4);
}

#[test]
fn test_run_rejects_missing_rating() {
    let data = TempDir::new().unwrap();
    let output = cli(&data)
        .args(["run", "--json"])
        .write_stdin("skip-goal\nend\nsave\nquit\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let events = json_lines(&output.stdout);
    let error = events.iter().find(|e| e["type"] == "error").unwrap();
    assert!(error["message"].as_str().unwrap().contains("rating is required"));
    assert_eq!(stats_json(&data)["total_sessions"], 0);
}

#[test]
fn test_run_reports_out_of_range_rating() {
    let data = TempDir::new().unwrap();
    let output = cli(&data)
        .args(["run", "--json"])
        .write_stdin("start x\nend\nsave 300 too much\nquit\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let events = json_lines(&output.stdout);
    let error = events.iter().find(|e| e["type"] == "error").unwrap();
    assert!(error["message"].as_str().unwrap().contains("Rating 300 is out of range (1-5)"));
    assert_eq!(stats_json(&data)["total_sessions"], 0);
}

#[test]
fn test_run_home_discards_sprint() {
    let data = TempDir::new().unwrap();
    let output = cli(&data)
        .args(["run", "--json"])
        .write_stdin("start x\npause\nresume\nhome\nsave 3\n")
        .output()
        .unwrap();
    assert!(output.status.success());

    let kinds: Vec<String> = json_lines(&output.stdout)
        .iter()
        .map(|e| e["type"].as_str().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["phase_started", "paused", "resumed", "returned_home", "error"]
    );
    assert_eq!(stats_json(&data)["total_sessions"], 0);
}

#[test]
fn test_run_text_mode() {
    let data = TempDir::new().unwrap();
    cli(&data)
        .args(["run", "--sprint-minutes", "50"])
        .write_stdin("start\nend\nsave 5\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("sprint started (50:00)"))
        .stdout(predicate::str::contains("(no specific goal)"))
        .stdout(predicate::str::contains("Sprint saved!"));
}

#[test]
fn test_run_rejects_bad_override() {
    let data = TempDir::new().unwrap();
    cli(&data)
        .args(["run", "--break-minutes", "0"])
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("break_minutes"));
}

#[test]
fn test_config_get_default() {
    let data = TempDir::new().unwrap();
    cli(&data)
        .args(["config", "get", "timer.sprint_minutes"])
        .assert()
        .success()
        .stdout("25.0\n");
}

#[test]
fn test_config_set_persists() {
    let data = TempDir::new().unwrap();
    cli(&data)
        .args(["config", "set", "timer.idle_threshold_ms", "20000"])
        .assert()
        .success();
    cli(&data)
        .args(["config", "get", "timer.idle_threshold_ms"])
        .assert()
        .success()
        .stdout("20000\n");
}

#[test]
fn test_config_set_unknown_key_fails() {
    let data = TempDir::new().unwrap();
    cli(&data)
        .args(["config", "set", "timer.volume", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_config_list_is_json() {
    let data = TempDir::new().unwrap();
    let output = cli(&data).args(["config", "list"]).output().unwrap();
    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["reflection"]["rating_scale"], 5);
}
