//! Pre-flight validation of database object names.
//!
//! Callers ask whether a schema, table or column exists in an environment's
//! metadata snapshot before issuing real database calls. Misses come back with
//! ranked near matches.
//!
//! ```
//! use preflight_core::{EnvironmentIndex, FuzzyMatcher, RawMetadata, Scope, Validator};
//!
//! let raw = RawMetadata::default().with_table("public", "Student", ["id", "email"]);
//! let index = EnvironmentIndex::build("dev", &raw);
//! let validator = Validator::new(&index, FuzzyMatcher::default());
//!
//! assert_eq!(validator.validate(Scope::Table, "STUDENT", None).matched(), Some("Student"));
//! assert_eq!(validator.validate(Scope::Table, "studnt", None).suggestions()[0].name, "Student");
//! ```

pub mod error;
pub mod index;
pub mod ingest;
pub mod matcher;
pub mod registry;
pub mod source;
pub mod types;
pub mod validator;

pub use error::{IngestError, LoadError, ServiceError};
pub use index::{EnvironmentIndex, EnvironmentStats, SearchableCandidate};
pub use ingest::{metadata_from_csv, CsvColumns, CsvImport};
pub use matcher::{FuzzyMatch, FuzzyMatcher, DEFAULT_MAX_RESULTS, DEFAULT_THRESHOLD};
pub use registry::{IndexRegistry, LoadStatus};
pub use source::{
    environment_from_path, snapshot_file_name, FileSnapshotSource, MemorySnapshotSource,
    SnapshotSource,
};
pub use types::{
    api_schema, normalize_name, ParseScopeError, RawCounts, RawMetadata, RawSchema, Scope,
    SuggestOptions, Suggestion, ValidationContext, ValidationRequest, ValidationResponse,
    ValidationResult, ValidationStatus,
};
pub use validator::Validator;

// Test utilities (must be at end of file)
#[cfg(test)]
pub mod test_utils;
