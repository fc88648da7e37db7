//! Types for the preflight validation API.
//!
//! This module defines the snapshot model consumed at load time and the
//! request and response types exchanged with transports.

mod common;
mod request;
mod response;
mod snapshot;

pub use common::{normalize_name, ParseScopeError, Scope};
pub(crate) use common::normalize_segment;
pub use request::{SuggestOptions, ValidationContext, ValidationRequest};
pub use response::{Suggestion, ValidationResponse, ValidationResult, ValidationStatus};
pub use snapshot::{RawCounts, RawMetadata, RawSchema};

/// JSON Schema of the wire and snapshot types, keyed by type name.
pub fn api_schema() -> serde_json::Value {
    let generator = || schemars::generate::SchemaSettings::draft07().into_generator();
    serde_json::json!({
        "RawMetadata": generator().into_root_schema_for::<RawMetadata>(),
        "ValidationRequest": generator().into_root_schema_for::<ValidationRequest>(),
        "ValidationResponse": generator().into_root_schema_for::<ValidationResponse>(),
        "Suggestion": generator().into_root_schema_for::<Suggestion>(),
    })
}
