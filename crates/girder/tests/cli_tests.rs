//! Integration tests for the girder CLI.
//!
//! These tests verify the end-to-end behavior of all CLI commands.

use rstest::{fixture, rstest};
use tempfile::TempDir;

mod common;
use common::run_girder_in_dir;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a fresh temporary directory for each test
#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Provides a temporary directory with an initialized girder directory
#[fixture]
fn initialized_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let output = run_girder_in_dir(temp.path(), &["init", "--quiet"]);
    assert!(
        output.status.success(),
        "Failed to initialize girder: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    temp
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[rstest]
fn test_cli_help(temp_dir: TempDir) {
    let output = run_girder_in_dir(temp_dir.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("girder"));
    assert!(stdout.contains("Usage:"));

    // Verify all main commands are listed
    for command in ["init", "add", "recent", "clear", "filter", "inspect"] {
        assert!(
            stdout.contains(command),
            "Help should show '{command}' command"
        );
    }
}

#[rstest]
fn test_cli_version(temp_dir: TempDir) {
    let output = run_girder_in_dir(temp_dir.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0.1.0"));
}

#[rstest]
fn test_cli_no_args(temp_dir: TempDir) {
    let output = run_girder_in_dir(temp_dir.path(), &[]);

    assert!(output.status.success());
}

// ============================================================================
// Init Tests
// ============================================================================

#[rstest]
fn test_init_creates_girder_directory(temp_dir: TempDir) {
    let output = run_girder_in_dir(temp_dir.path(), &["init"]);

    assert!(output.status.success());
    assert!(temp_dir.path().join(".girder/config.yaml").exists());
    assert!(temp_dir.path().join(".girder/history.jsonl").exists());
    assert!(temp_dir.path().join(".girder/filters.jsonl").exists());
}

#[rstest]
fn test_init_twice_fails(initialized_dir: TempDir) {
    let output = run_girder_in_dir(initialized_dir.path(), &["init"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already initialized"));
}

#[rstest]
fn test_init_rejects_zero_cap(temp_dir: TempDir) {
    let output = run_girder_in_dir(temp_dir.path(), &["init", "--max-items", "0"]);

    assert!(!output.status.success());
}

#[rstest]
fn test_init_json_output(temp_dir: TempDir) {
    let output = run_girder_in_dir(temp_dir.path(), &["--json", "init", "--max-items", "20"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("init output not JSON");
    assert_eq!(parsed["default_max_items"], 20);
}

// ============================================================================
// Add / Recent / Clear Tests
// ============================================================================

#[rstest]
fn test_add_then_recent(initialized_dir: TempDir) {
    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["add", "alice", "issue", "PROJ-42"],
    );
    assert!(
        output.status.success(),
        "add failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = run_girder_in_dir(initialized_dir.path(), &["recent", "alice", "issue"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PROJ-42"));
}

#[rstest]
fn test_recent_is_most_recent_first(initialized_dir: TempDir) {
    for id in ["PROJ-1", "PROJ-2", "PROJ-3"] {
        let output = run_girder_in_dir(initialized_dir.path(), &["add", "alice", "issue", id]);
        assert!(output.status.success());
    }

    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["--json", "recent", "alice", "issue"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let items: serde_json::Value = serde_json::from_str(&stdout).expect("recent output not JSON");
    let ids: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["entity_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["PROJ-3", "PROJ-2", "PROJ-1"]);
}

#[rstest]
fn test_re_adding_moves_to_front(initialized_dir: TempDir) {
    for id in ["PROJ-1", "PROJ-2", "PROJ-1"] {
        let output = run_girder_in_dir(initialized_dir.path(), &["add", "alice", "issue", id]);
        assert!(output.status.success());
    }

    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["--json", "recent", "alice", "issue"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let items: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let ids: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["entity_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["PROJ-1", "PROJ-2"], "no duplicate, PROJ-1 in front");
}

#[rstest]
fn test_recent_respects_limit(initialized_dir: TempDir) {
    for n in 1..=4 {
        let id = format!("PROJ-{n}");
        let output = run_girder_in_dir(initialized_dir.path(), &["add", "alice", "issue", &id]);
        assert!(output.status.success());
    }

    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["--json", "recent", "alice", "issue", "--limit", "2"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let items: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(items.as_array().unwrap().len(), 2);
}

#[rstest]
fn test_add_rejects_unknown_category(initialized_dir: TempDir) {
    let output = run_girder_in_dir(initialized_dir.path(), &["add", "alice", "sprint", "S-1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sprint"));
}

#[rstest]
fn test_clear_reports_populated_categories(initialized_dir: TempDir) {
    run_girder_in_dir(initialized_dir.path(), &["add", "alice", "issue", "PROJ-1"]);
    run_girder_in_dir(
        initialized_dir.path(),
        &["add", "alice", "project", "PROJ"],
    );

    let output = run_girder_in_dir(initialized_dir.path(), &["--json", "clear", "alice"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let cleared: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(
        cleared.as_array().unwrap(),
        &[serde_json::json!("issue"), serde_json::json!("project")]
    );

    let output = run_girder_in_dir(initialized_dir.path(), &["recent", "alice", "issue"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No recent issue items"));
}

#[rstest]
fn test_clear_without_history(initialized_dir: TempDir) {
    let output = run_girder_in_dir(initialized_dir.path(), &["clear", "nobody"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No history to clear"));
}

#[rstest]
fn test_history_persists_across_invocations(initialized_dir: TempDir) {
    run_girder_in_dir(initialized_dir.path(), &["add", "alice", "issue", "PROJ-1"]);

    // Fresh process, same data directory.
    let output = run_girder_in_dir(initialized_dir.path(), &["recent", "alice", "issue"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("PROJ-1"));
}

#[rstest]
fn test_corrupt_history_rows_are_reported_as_warnings(initialized_dir: TempDir) {
    run_girder_in_dir(initialized_dir.path(), &["add", "alice", "issue", "PROJ-1"]);

    // Hand-corrupt the data file; the row must be skipped with a visible
    // warning, not fail the command.
    let history_path = initialized_dir.path().join(".girder/history.jsonl");
    let mut contents = std::fs::read_to_string(&history_path).unwrap();
    contents.push_str("{{{ not json\n");
    std::fs::write(&history_path, contents).unwrap();

    let output = run_girder_in_dir(initialized_dir.path(), &["recent", "alice", "issue"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("warning:"), "stdout: {stdout}");
    assert!(stdout.contains("skipped history row"), "stdout: {stdout}");
    assert!(stdout.contains("PROJ-1"));

    // JSON output must stay machine-parseable: the warning goes to stderr
    // (via tracing) instead of stdout.
    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["--json", "recent", "alice", "issue"],
    );
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be pure JSON");
    assert_eq!(parsed[0]["entity_id"], "PROJ-1");
}

#[rstest]
fn test_commands_fail_outside_a_girder_directory(temp_dir: TempDir) {
    let output = run_girder_in_dir(temp_dir.path(), &["add", "alice", "issue", "PROJ-1"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not a girder repository"));
}

// ============================================================================
// Filter Tests
// ============================================================================

#[rstest]
fn test_filter_set_show_remove(initialized_dir: TempDir) {
    let output = run_girder_in_dir(
        initialized_dir.path(),
        &[
            "filter",
            "set",
            "assignee-picker",
            "--group",
            "developers",
            "--role",
            "10001",
        ],
    );
    assert!(
        output.status.success(),
        "filter set failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["--json", "filter", "show", "assignee-picker"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let filter: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(filter["enabled"], true);
    assert_eq!(filter["groups"], serde_json::json!(["developers"]));
    assert_eq!(filter["roles"], serde_json::json!([10001]));

    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["filter", "remove", "assignee-picker"],
    );
    assert!(output.status.success());

    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["filter", "show", "assignee-picker"],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("unrestricted"));
}

#[rstest]
fn test_filter_set_rejects_zero_role(initialized_dir: TempDir) {
    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["filter", "set", "assignee-picker", "--role", "0"],
    );

    assert!(!output.status.success());
}

#[rstest]
fn test_filter_list_empty(initialized_dir: TempDir) {
    let output = run_girder_in_dir(initialized_dir.path(), &["filter", "list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No filters stored"));
}

// ============================================================================
// Inspect Tests
// ============================================================================

#[rstest]
fn test_inspect_valid_backup(initialized_dir: TempDir) {
    let backup = serde_json::json!({
        "system_information": { "build_number": 445, "edition": "enterprise" },
        "projects": [
            { "id": 10000, "key": "PROJ", "name": "Main", "issue_ids": [1, 2, 3] }
        ]
    });
    let backup_path = initialized_dir.path().join("backup.json");
    std::fs::write(&backup_path, backup.to_string()).unwrap();

    let output = run_girder_in_dir(
        initialized_dir.path(),
        &["--json", "inspect", "backup.json"],
    );
    assert!(
        output.status.success(),
        "inspect failed: {:?}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    let overview: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(overview["system_information"]["build_number"], 445);
    assert_eq!(overview["projects"][0]["key"], "PROJ");
    assert_eq!(overview["digest"].as_str().unwrap().len(), 64);
}

#[rstest]
fn test_inspect_missing_backup(temp_dir: TempDir) {
    let output = run_girder_in_dir(temp_dir.path(), &["inspect", "nope.json"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("does not exist"));
}

#[rstest]
fn test_inspect_malformed_backup(temp_dir: TempDir) {
    let backup_path = temp_dir.path().join("backup.json");
    std::fs::write(&backup_path, "{ not json").unwrap();

    let output = run_girder_in_dir(temp_dir.path(), &["inspect", "backup.json"]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("not a valid backup export"));
}
