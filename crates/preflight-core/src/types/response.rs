//! Result types produced by validation and typeahead calls.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A near-match with its similarity score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Suggestion {
    /// Suggested name in its original casing.
    pub name: String,
    /// Similarity score, 0 to 100.
    pub score: u8,
}

impl Suggestion {
    pub fn new(name: impl Into<String>, score: u8) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Outcome of a single validation call. Every variant is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationResult {
    /// Exact (case-insensitive) match, reported in original casing.
    Valid {
        #[serde(rename = "match")]
        matched: String,
    },
    /// No exact match; ranked near-matches above the threshold.
    Suggestions { suggestions: Vec<Suggestion> },
    /// No exact match and nothing scored high enough.
    NotFound,
}

impl ValidationResult {
    pub fn status(&self) -> ValidationStatus {
        match self {
            ValidationResult::Valid { .. } => ValidationStatus::Valid,
            ValidationResult::Suggestions { .. } => ValidationStatus::Suggestions,
            ValidationResult::NotFound => ValidationStatus::NotFound,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    pub fn matched(&self) -> Option<&str> {
        match self {
            ValidationResult::Valid { matched } => Some(matched),
            _ => None,
        }
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            ValidationResult::Suggestions { suggestions } => suggestions,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Valid,
    Suggestions,
    NotFound,
}

/// Flat wire shape of a [`ValidationResult`].
///
/// `match` is set only for `valid`; `suggestions` is `null` for `valid` and
/// an empty list for `not_found`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResponse {
    pub status: ValidationStatus,
    #[serde(rename = "match")]
    pub matched: Option<String>,
    pub suggestions: Option<Vec<Suggestion>>,
}

impl From<ValidationResult> for ValidationResponse {
    fn from(result: ValidationResult) -> Self {
        let status = result.status();
        match result {
            ValidationResult::Valid { matched } => Self {
                status,
                matched: Some(matched),
                suggestions: None,
            },
            ValidationResult::Suggestions { suggestions } => Self {
                status,
                matched: None,
                suggestions: Some(suggestions),
            },
            ValidationResult::NotFound => Self {
                status,
                matched: None,
                suggestions: Some(Vec::new()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_tagged_serialization() {
        let valid = ValidationResult::Valid {
            matched: "Student".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&valid).unwrap(),
            json!({"status": "valid", "match": "Student"})
        );
        assert_eq!(
            serde_json::to_value(ValidationResult::NotFound).unwrap(),
            json!({"status": "not_found"})
        );
    }

    #[test]
    fn test_response_shapes() {
        let response = ValidationResponse::from(ValidationResult::NotFound);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"status": "not_found", "match": null, "suggestions": []})
        );

        let response = ValidationResponse::from(ValidationResult::Suggestions {
            suggestions: vec![Suggestion::new("student", 92)],
        });
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "suggestions",
                "match": null,
                "suggestions": [{"name": "student", "score": 92}]
            })
        );
    }

    #[test]
    fn test_accessors() {
        let result = ValidationResult::Suggestions {
            suggestions: vec![Suggestion::new("orders", 80)],
        };
        assert!(!result.is_valid());
        assert_eq!(result.matched(), None);
        assert_eq!(result.suggestions().len(), 1);
        assert!(ValidationResult::NotFound.suggestions().is_empty());
    }
}
