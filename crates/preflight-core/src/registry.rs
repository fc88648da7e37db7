//! Ownership of one [`EnvironmentIndex`] per configured environment.
//!
//! Indexes are immutable once built and handed out as `Arc` clones. A reload
//! builds the replacement off to the side and publishes it with a single
//! write-locked pointer swap, so a reader holding an `Arc` keeps a consistent
//! index for as long as it needs one.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::{LoadError, ServiceError};
use crate::index::{EnvironmentIndex, EnvironmentStats};
use crate::source::SnapshotSource;

/// Outcome of the most recent load attempt for one environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// No load has been attempted yet.
    Pending,
    Loaded { schemas: usize, tables: usize },
    NotFound,
    Error(String),
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    fn from_error(err: &LoadError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Error(err.to_string())
        }
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("not loaded"),
            Self::Loaded { schemas, tables } => {
                write!(f, "loaded ({schemas} schemas, {tables} tables)")
            }
            Self::NotFound => f.write_str("resource not found"),
            Self::Error(detail) => write!(f, "error: {detail}"),
        }
    }
}

impl Serialize for LoadStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug)]
struct Slot {
    index: Option<Arc<EnvironmentIndex>>,
    status: LoadStatus,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            index: None,
            status: LoadStatus::Pending,
        }
    }
}

/// Registry of per-environment indexes, in configured order.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    slots: RwLock<IndexMap<String, Slot>>,
}

impl IndexRegistry {
    /// Creates a registry for `environments`. Blank and repeated names are
    /// ignored; nothing is loaded yet.
    pub fn new<I, S>(environments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let slots = environments
            .into_iter()
            .map(|env| env.as_ref().trim().to_string())
            .filter(|env| !env.is_empty())
            .map(|env| (env, Slot::default()))
            .collect();
        Self {
            slots: RwLock::new(slots),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, Slot>> {
        self.slots.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, Slot>> {
        self.slots.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Configured environment names, loaded or not.
    pub fn environments(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn is_configured(&self, environment: &str) -> bool {
        self.read().contains_key(environment)
    }

    /// Attempts every configured environment independently and returns the
    /// resulting status of each.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn load_all(&self, source: &dyn SnapshotSource) -> IndexMap<String, LoadStatus> {
        for environment in self.environments() {
            // Failures are recorded in the slot status.
            let _ = self.reload(&environment, source);
        }

        #[cfg(feature = "tracing")]
        tracing::info!(
            loaded = self.available_environments().len(),
            configured = self.read().len(),
            "metadata load complete"
        );

        self.load_status()
    }

    /// Rebuilds one environment from `source` and publishes it.
    ///
    /// On failure the previously published index, if any, stays in service
    /// and its status is left untouched; an environment that never loaded
    /// records the failure. An environment not yet configured is added.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, source)))]
    pub fn reload(
        &self,
        environment: &str,
        source: &dyn SnapshotSource,
    ) -> Result<Arc<EnvironmentIndex>, LoadError> {
        // Build without holding the lock; only the swap is exclusive.
        match EnvironmentIndex::load_from(environment, source) {
            Ok(index) => {
                let index = Arc::new(index);
                self.publish(environment, Arc::clone(&index));

                #[cfg(feature = "tracing")]
                tracing::info!(
                    environment,
                    schemas = index.schema_count(),
                    tables = index.table_count(),
                    columns = index.column_count(),
                    "loaded metadata index"
                );

                Ok(index)
            }
            Err(err) => {
                let mut slots = self.write();
                let slot = slots.entry(environment.to_string()).or_default();
                if slot.index.is_none() {
                    slot.status = LoadStatus::from_error(&err);
                }

                #[cfg(feature = "tracing")]
                {
                    if err.is_not_found() {
                        tracing::warn!(environment, error = %err, "metadata snapshot not found");
                    } else {
                        tracing::error!(environment, error = %err, "failed to load metadata snapshot");
                    }
                }

                Err(err)
            }
        }
    }

    /// Publishes an already built index for `environment`.
    pub fn publish(&self, environment: &str, index: Arc<EnvironmentIndex>) {
        let status = LoadStatus::Loaded {
            schemas: index.schema_count(),
            tables: index.table_count(),
        };
        let mut slots = self.write();
        let slot = slots.entry(environment.to_string()).or_default();
        slot.index = Some(index);
        slot.status = status;
    }

    pub fn get(&self, environment: &str) -> Option<Arc<EnvironmentIndex>> {
        self.read()
            .get(environment)
            .and_then(|slot| slot.index.clone())
    }

    /// Resolves `environment` to a loaded index, distinguishing a service with
    /// nothing loaded from a request for an unavailable environment.
    pub fn require(&self, environment: &str) -> Result<Arc<EnvironmentIndex>, ServiceError> {
        if let Some(index) = self.get(environment) {
            return Ok(index);
        }
        let available = self.available_environments();
        if available.is_empty() {
            return Err(ServiceError::NoIndexLoaded);
        }
        Err(ServiceError::UnknownEnvironment {
            environment: environment.to_string(),
            available,
        })
    }

    pub fn is_any_loaded(&self) -> bool {
        self.read().values().any(|slot| slot.index.is_some())
    }

    /// Environments with a published index, in configured order.
    pub fn available_environments(&self) -> Vec<String> {
        self.read()
            .iter()
            .filter(|(_, slot)| slot.index.is_some())
            .map(|(env, _)| env.clone())
            .collect()
    }

    pub fn load_status(&self) -> IndexMap<String, LoadStatus> {
        self.read()
            .iter()
            .map(|(env, slot)| (env.clone(), slot.status.clone()))
            .collect()
    }

    /// Statistics for every loaded environment.
    pub fn stats_for_all(&self) -> IndexMap<String, EnvironmentStats> {
        self.read()
            .iter()
            .filter_map(|(env, slot)| Some((env.clone(), slot.index.as_ref()?.stats())))
            .collect()
    }
}
