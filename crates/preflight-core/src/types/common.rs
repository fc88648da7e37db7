//! Common types shared between request and response.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Level of the metadata hierarchy a validation or suggestion call targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, PartialOrd, Ord,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Schema,
    Table,
    Column,
}

impl Scope {
    /// All scopes, outermost first.
    pub const ALL: [Scope; 3] = [Scope::Schema, Scope::Table, Scope::Column];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Schema => "schema",
            Scope::Table => "table",
            Scope::Column => "column",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown scope name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid scope '{0}': expected schema, table, or column")]
pub struct ParseScopeError(pub String);

impl FromStr for Scope {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "schema" => Ok(Scope::Schema),
            "table" => Ok(Scope::Table),
            "column" => Ok(Scope::Column),
            _ => Err(ParseScopeError(s.to_string())),
        }
    }
}

/// Canonical lookup key for a database object name.
///
/// Every external name passes through here exactly once at the ingress of a
/// public operation. Internal structures store only the returned form.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Normalizes an optional context segment, treating blank values as absent.
pub(crate) fn normalize_segment(segment: Option<&str>) -> Option<String> {
    segment
        .map(normalize_name)
        .filter(|normalized| !normalized.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name_trims_and_lowercases() {
        assert_eq!(normalize_name("  Student_ID \t"), "student_id");
        assert_eq!(normalize_name("PUBLIC"), "public");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_normalize_segment_drops_blank() {
        assert_eq!(normalize_segment(Some("  ")), None);
        assert_eq!(normalize_segment(None), None);
        assert_eq!(normalize_segment(Some(" Sales ")), Some("sales".to_string()));
    }

    #[test]
    fn test_scope_round_trips_through_str() {
        for scope in Scope::ALL {
            assert_eq!(scope.as_str().parse::<Scope>(), Ok(scope));
        }
        assert_eq!("  TABLE ".parse::<Scope>(), Ok(Scope::Table));
        assert!("view".parse::<Scope>().is_err());
    }

    #[test]
    fn test_scope_serializes_lowercase() {
        let json = serde_json::to_string(&Scope::Column).unwrap();
        assert_eq!(json, "\"column\"");
    }
}
