//! Shared application state for the server.
//!
//! `AppState` holds the server configuration, the index registry and the
//! snapshot source used for reloads. State is shared across handlers via
//! `Arc`; the registry does its own locking.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use preflight_core::{
    EnvironmentIndex, FileSnapshotSource, FuzzyMatcher, IndexRegistry, LoadError, SnapshotSource,
};

/// Server configuration derived from CLI arguments.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Directory holding metadata_<env>.json snapshots
    pub data_dir: PathBuf,
    /// Configured environments, in display order
    pub environments: Vec<String>,
    /// Default threshold and limit for validation and typeahead
    pub matcher: FuzzyMatcher,
    /// Reload snapshots when they change on disk
    pub watch: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

/// Shared application state.
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Per-environment indexes
    pub registry: IndexRegistry,
    /// Where snapshots are (re)loaded from
    pub source: Arc<dyn SnapshotSource>,
}

impl AppState {
    /// Create state backed by the snapshot files in `config.data_dir`,
    /// loading every configured environment.
    pub fn new(config: ServerConfig) -> Self {
        let source = Arc::new(FileSnapshotSource::new(&config.data_dir));
        Self::with_source(config, source)
    }

    /// Create state over an arbitrary source, loading every configured
    /// environment.
    pub fn with_source(config: ServerConfig, source: Arc<dyn SnapshotSource>) -> Self {
        let registry = IndexRegistry::new(&config.environments);
        for (environment, status) in registry.load_all(source.as_ref()) {
            if status.is_loaded() {
                tracing::info!("[{}] {status}", environment.to_uppercase());
            } else {
                tracing::warn!("[{}] {status}", environment.to_uppercase());
            }
        }

        if registry.is_any_loaded() {
            tracing::info!(
                available = ?registry.available_environments(),
                "service ready"
            );
        } else {
            tracing::warn!("no environment loaded; validation unavailable");
        }

        Self {
            config,
            registry,
            source,
        }
    }

    /// Rebuild one environment from the source.
    pub fn reload(&self, environment: &str) -> Result<Arc<EnvironmentIndex>, LoadError> {
        self.registry.reload(environment, self.source.as_ref())
    }
}
