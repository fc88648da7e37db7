//! Where snapshots come from.
//!
//! The registry only needs "give me the raw metadata for environment X". A
//! directory of `metadata_<env>.json` files covers deployments; an in-memory
//! map covers tests and embedding.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::error::LoadError;
use crate::types::RawMetadata;

/// A provider of per-environment snapshots.
pub trait SnapshotSource: Send + Sync {
    /// Fetches the current snapshot for `environment`.
    fn fetch(&self, environment: &str) -> Result<RawMetadata, LoadError>;
}

/// File name of an environment's snapshot inside a data directory.
pub fn snapshot_file_name(environment: &str) -> String {
    format!("metadata_{environment}.json")
}

/// Inverse of [`snapshot_file_name`]: extracts the environment from a path
/// like `.../metadata_dev.json`.
pub fn environment_from_path(path: &Path) -> Option<&str> {
    path.file_name()?
        .to_str()?
        .strip_prefix("metadata_")?
        .strip_suffix(".json")
        .filter(|env| !env.is_empty())
}

/// Reads `<dir>/metadata_<env>.json` on every fetch.
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    dir: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, environment: &str) -> PathBuf {
        self.dir.join(snapshot_file_name(environment))
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn fetch(&self, environment: &str) -> Result<RawMetadata, LoadError> {
        let path = self.path_for(environment);
        let content = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == ErrorKind::NotFound {
                LoadError::NotFound {
                    environment: environment.to_string(),
                    path: path.clone(),
                }
            } else {
                LoadError::Io {
                    environment: environment.to_string(),
                    source,
                }
            }
        })?;

        RawMetadata::from_json(&content).map_err(|source| LoadError::Malformed {
            environment: environment.to_string(),
            source,
        })
    }
}

/// Snapshots held in memory, replaceable at runtime.
#[derive(Debug, Default)]
pub struct MemorySnapshotSource {
    snapshots: RwLock<HashMap<String, RawMetadata>>,
}

impl MemorySnapshotSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, environment: impl Into<String>, raw: RawMetadata) -> Self {
        self.insert(environment, raw);
        self
    }

    /// Inserts or replaces the snapshot for `environment`.
    pub fn insert(&self, environment: impl Into<String>, raw: RawMetadata) {
        let mut snapshots = self
            .snapshots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        snapshots.insert(environment.into(), raw);
    }

    pub fn remove(&self, environment: &str) -> Option<RawMetadata> {
        let mut snapshots = self
            .snapshots
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        snapshots.remove(environment)
    }
}

impl SnapshotSource for MemorySnapshotSource {
    fn fetch(&self, environment: &str) -> Result<RawMetadata, LoadError> {
        let snapshots = self
            .snapshots
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        snapshots
            .get(environment)
            .cloned()
            .ok_or_else(|| LoadError::Missing {
                environment: environment.to_string(),
            })
    }
}
