//! Request types for validation and typeahead calls.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Scope;

/// Optional schema/table context narrowing a validation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationContext {
    /// Schema to search within (table and column scope).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    /// Table to search within (column scope, only together with `schema_name`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
}

impl ValidationContext {
    pub fn schema(schema: impl Into<String>) -> Self {
        Self {
            schema_name: Some(schema.into()),
            table_name: None,
        }
    }

    pub fn table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema_name: Some(schema.into()),
            table_name: Some(table.into()),
        }
    }
}

/// A validation request as accepted by transports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationRequest {
    /// Environment whose snapshot is consulted.
    pub environment: String,

    /// Level of the hierarchy to validate.
    pub scope: Scope,

    /// The name to validate.
    pub search_term: String,

    /// Optional context narrowing the search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ValidationContext>,
}

/// Filters and overrides for a typeahead call.
///
/// `threshold` and `limit` fall back to the matcher defaults when unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_request_deserializes_without_context() {
        let json = r#"{"environment": "dev", "scope": "table", "search_term": "student"}"#;
        let request: ValidationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.scope, Scope::Table);
        assert_eq!(request.context, None);
    }

    #[test]
    fn test_validation_request_with_context() {
        let json = r#"{
            "environment": "qa",
            "scope": "column",
            "search_term": "email",
            "context": {"schema_name": "public", "table_name": "student"}
        }"#;
        let request: ValidationRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            request.context,
            Some(ValidationContext::table("public", "student"))
        );
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        let json = r#"{"environment": "dev", "scope": "view", "search_term": "v"}"#;
        assert!(serde_json::from_str::<ValidationRequest>(json).is_err());
    }
}
