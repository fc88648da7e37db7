//! Error types for snapshot loading, CSV ingestion and service lookups.
//!
//! Validation itself never fails: a name that cannot be resolved yields a
//! [`crate::ValidationResult::NotFound`], not an error. Errors here cover the
//! edges around the index: reading snapshots, converting exports, and asking
//! for environments that are not loaded.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while fetching a snapshot for an environment.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("snapshot for '{environment}' not found at {}", path.display())]
    NotFound { environment: String, path: PathBuf },

    #[error("snapshot for '{environment}' is not available")]
    Missing { environment: String },

    #[error("malformed snapshot for '{environment}': {source}")]
    Malformed {
        environment: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error reading snapshot for '{environment}': {source}")]
    Io {
        environment: String,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// True when the snapshot simply does not exist, as opposed to being
    /// unreadable or corrupt.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Missing { .. })
    }
}

/// Errors raised while converting a flat CSV export into a snapshot.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV input is empty or has no header row")]
    NoHeaders,

    #[error("Missing columns in CSV: {}. Available columns: {}", missing.join(", "), available.join(", "))]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors raised by the service layer when resolving an environment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("No metadata caches loaded. Service is starting up.")]
    NoIndexLoaded,

    #[error("Environment '{environment}' not available. Available: {}", available.join(", "))]
    UnknownEnvironment {
        environment: String,
        available: Vec<String>,
    },
}
