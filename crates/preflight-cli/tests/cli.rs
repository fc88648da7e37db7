use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

const DEV_SNAPSHOT: &str = r#"{
  "schemas": {
    "public": {"tables": {"student": ["id", "name", "email"], "course": ["id", "title"]}},
    "sales": {"tables": {"order": ["order_id", "total"]}}
  },
  "exported_at": "2024-01-01T00:00:00"
}"#;

fn data_dir() -> tempfile::TempDir {
    let dir = tempdir().expect("temp dir");
    std::fs::write(dir.path().join("metadata_dev.json"), DEV_SNAPSHOT).expect("write snapshot");
    dir
}

fn preflight(data_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_preflight"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("PREFLIGHT_ENVIRONMENTS")
        .env_remove("PREFLIGHT_FUZZY_THRESHOLD")
        .env_remove("PREFLIGHT_MAX_SUGGESTIONS")
        .output()
        .expect("run CLI")
}

#[test]
fn test_check_valid() {
    let dir = data_dir();
    let output = preflight(dir.path(), &["check", "table", "Student", "public"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "Expected exit 0, got: {stdout}");
    assert!(stdout.contains("Environment: dev"), "{stdout}");
    assert!(stdout.contains("✓ VALID: 'student'"), "{stdout}");
}

#[test]
fn test_check_suggestions_exit_code() {
    let dir = data_dir();
    let output = preflight(dir.path(), &["check", "table", "studnt"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(1), "{stdout}");
    assert!(stdout.contains("→ student (92%)"), "{stdout}");
}

#[test]
fn test_check_not_found_exit_code() {
    let dir = data_dir();
    let output = preflight(
        dir.path(),
        &["check", "column", "mail", "public", "student", "--threshold", "90"],
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(2), "{stdout}");
    assert!(stdout.contains("✗ NOT FOUND: 'mail'"), "{stdout}");
}

#[test]
fn test_check_json_output() {
    let dir = data_dir();
    let output = preflight(dir.path(), &["check", "table", "studnt", "--format", "json"]);

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json["status"], "suggestions");
    assert_eq!(json["suggestions"][0]["name"], "student");
    assert_eq!(json["suggestions"][0]["score"], 92);
}

#[test]
fn test_check_missing_environment_is_config_error() {
    let dir = data_dir();
    let output = preflight(dir.path(), &["check", "table", "student", "--env", "prod"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(66), "{stderr}");
    assert!(stderr.contains("preflight: error:"), "{stderr}");
    assert!(stderr.contains("available environments: dev"), "{stderr}");
}

#[test]
fn test_check_missing_snapshot_file_is_config_error() {
    let dir = data_dir();
    let missing = dir.path().join("nope.json");
    let output = preflight(
        dir.path(),
        &["check", "table", "student", "--snapshot", missing.to_str().expect("path")],
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(66), "{stderr}");
    assert!(stderr.contains("not found"), "{stderr}");
}

#[test]
fn test_blank_environment_list_is_config_error() {
    let dir = data_dir();
    let output = preflight(dir.path(), &["stats", "--environments", " , "]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(66), "{stderr}");
    assert!(stderr.contains("no environments configured"), "{stderr}");
}

#[test]
fn test_convert_failure_is_command_error() {
    let dir = tempdir().expect("temp dir");
    let csv = dir.path().join("export.csv");
    std::fs::write(&csv, "name,kind\nstudent,table\n").expect("write csv");

    let output = preflight(dir.path(), &["convert", csv.to_str().expect("csv path"), "qa"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "{stderr}");
    assert!(stderr.contains("Missing columns in CSV"), "{stderr}");
    assert!(!dir.path().join("metadata_qa.json").exists());
}

#[test]
fn test_suggest_with_scores() {
    let dir = data_dir();
    let output = preflight(
        dir.path(),
        &["suggest", "column", "mail", "--schema", "public", "--scores", "--format", "json"],
    );

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(json[0]["name"], "public.student.email");
    assert_eq!(json[0]["score"], 88);
}

#[test]
fn test_stats_lists_every_environment() {
    let dir = data_dir();
    let output = preflight(dir.path(), &["stats", "--format", "json"]);

    assert!(output.status.success());
    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[3]["environment"], "dev");
    assert_eq!(rows[3]["status"], "loaded (2 schemas, 3 tables)");
    assert_eq!(rows[0]["status"], "resource not found");
}

#[test]
fn test_stats_without_snapshots_fails() {
    let dir = tempdir().expect("temp dir");
    let output = preflight(dir.path(), &["stats"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_convert_then_check() {
    let dir = tempdir().expect("temp dir");
    let csv = dir.path().join("export.csv");
    std::fs::write(
        &csv,
        "schema,table,column\nhr,Employee,emp_id\nhr,Employee,salary\n,,\n",
    )
    .expect("write csv");

    let output = preflight(dir.path(), &["convert", csv.to_str().expect("csv path"), "qa"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{stdout}");
    assert!(stdout.contains("Rows:    2"), "{stdout}");
    assert!(dir.path().join("metadata_qa.json").exists());

    let output = preflight(dir.path(), &["check", "column", "SALARY", "--env", "qa"]);
    assert!(output.status.success());
}

#[test]
fn test_schema_command_prints_json_schema() {
    let dir = tempdir().expect("temp dir");
    let output = preflight(dir.path(), &["schema"]);

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert!(json["ValidationRequest"].is_object());
    assert!(json["RawMetadata"].is_object());
}
