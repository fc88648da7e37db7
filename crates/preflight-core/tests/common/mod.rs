use std::path::PathBuf;
use std::sync::Arc;

use preflight_core::{EnvironmentIndex, FileSnapshotSource, IndexRegistry};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Registry over the fixture directory; only `dev` has a snapshot.
#[allow(dead_code)]
pub fn fixture_registry() -> IndexRegistry {
    let registry = IndexRegistry::new(["prod", "stage", "qa", "dev"]);
    registry.load_all(&FileSnapshotSource::new(fixtures_dir()));
    registry
}

#[allow(dead_code)]
pub fn dev_index() -> Arc<EnvironmentIndex> {
    fixture_registry()
        .require("dev")
        .unwrap_or_else(|e| panic!("dev fixture failed to load: {e}"))
}
