use std::fs;

use preflight_core::{FileSnapshotSource, IndexRegistry, LoadError, LoadStatus, Scope};

const STUDENT_ONLY: &str = r#"{"schemas": {"public": {"tables": {"student": ["id"]}}}}"#;
const WITH_COURSE: &str =
    r#"{"schemas": {"public": {"tables": {"student": ["id"], "course": ["id", "title"]}}}}"#;

#[test]
fn reload_picks_up_rewritten_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("metadata_dev.json"), STUDENT_ONLY).unwrap();

    let source = FileSnapshotSource::new(dir.path());
    let registry = IndexRegistry::new(["dev"]);
    registry.load_all(&source);
    let old = registry.require("dev").unwrap();
    assert!(!old.table_exists("course", None));

    fs::write(dir.path().join("metadata_dev.json"), WITH_COURSE).unwrap();
    registry.reload("dev", &source).unwrap();

    assert!(registry.require("dev").unwrap().table_exists("course", Some("public")));
    assert!(!old.table_exists("course", None));
    assert_eq!(
        registry.load_status()["dev"],
        LoadStatus::Loaded {
            schemas: 1,
            tables: 2
        }
    );
}

#[test]
fn corrupt_snapshot_is_reported_and_isolated() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("metadata_qa.json"), "{\"schemas\": [1, 2]}").unwrap();
    fs::write(dir.path().join("metadata_dev.json"), STUDENT_ONLY).unwrap();

    let registry = IndexRegistry::new(["qa", "dev"]);
    let status = registry.load_all(&FileSnapshotSource::new(dir.path()));

    assert!(status["qa"].to_string().starts_with("error: "));
    assert!(status["dev"].is_loaded());
    assert_eq!(registry.available_environments(), ["dev"]);
}

#[test]
fn corrupt_rewrite_keeps_serving_previous_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metadata_dev.json");
    fs::write(&path, STUDENT_ONLY).unwrap();

    let source = FileSnapshotSource::new(dir.path());
    let registry = IndexRegistry::new(["dev"]);
    registry.load_all(&source);

    fs::write(&path, "{ truncated").unwrap();
    let err = registry.reload("dev", &source).unwrap_err();
    assert!(matches!(err, LoadError::Malformed { .. }));

    let index = registry.require("dev").unwrap();
    assert_eq!(index.candidates_for_scope(Scope::Table, None, None), ["student"]);
}
