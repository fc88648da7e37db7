//! Human-readable output for `check` and `suggest`.

use std::fmt::Write;

use owo_colors::OwoColorize;
use preflight_core::{Scope, Suggestion, ValidationResult};

/// What was checked, echoed above the result.
#[derive(Debug, Clone, Copy)]
pub struct CheckSummary<'a> {
    pub environment: &'a str,
    pub scope: Scope,
    pub name: &'a str,
    pub schema: Option<&'a str>,
    pub table: Option<&'a str>,
}

/// Format a validation result with optional colors.
pub fn format_validation(
    summary: &CheckSummary<'_>,
    result: &ValidationResult,
    colored: bool,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Environment: {}", summary.environment);
    let _ = write!(out, "Validating {}: '{}'", summary.scope, summary.name);
    if let Some(schema) = summary.schema {
        let _ = write!(out, " in schema '{schema}'");
    }
    if let Some(table) = summary.table {
        let _ = write!(out, ", table '{table}'");
    }
    let _ = writeln!(out);
    let _ = writeln!(out);

    match result {
        ValidationResult::Valid { matched } => {
            let line = format!("✓ VALID: '{matched}'");
            if colored {
                let _ = writeln!(out, "{}", line.green().bold());
            } else {
                let _ = writeln!(out, "{line}");
            }
        }
        ValidationResult::Suggestions { suggestions } => {
            let line = format!("? SUGGESTIONS for '{}':", summary.name);
            if colored {
                let _ = writeln!(out, "{}", line.yellow().bold());
            } else {
                let _ = writeln!(out, "{line}");
            }
            for suggestion in suggestions {
                let _ = writeln!(out, "    → {} ({}%)", suggestion.name, suggestion.score);
            }
        }
        ValidationResult::NotFound => {
            let line = format!("✗ NOT FOUND: '{}'", summary.name);
            if colored {
                let _ = writeln!(out, "{}", line.red().bold());
            } else {
                let _ = writeln!(out, "{line}");
            }
        }
    }

    out
}

/// Format typeahead suggestions, one per line.
pub fn format_suggestions(suggestions: &[Suggestion], with_scores: bool, colored: bool) -> String {
    if suggestions.is_empty() {
        return if colored {
            format!("{}\n", "No suggestions".dimmed())
        } else {
            "No suggestions\n".to_string()
        };
    }

    let width = suggestions.iter().map(|s| s.name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for suggestion in suggestions {
        if with_scores {
            let score = format!("{:>3}", suggestion.score);
            if colored {
                let _ = writeln!(out, "{:<width$}  {}", suggestion.name, score.cyan());
            } else {
                let _ = writeln!(out, "{:<width$}  {score}", suggestion.name);
            }
        } else {
            let _ = writeln!(out, "{}", suggestion.name);
        }
    }
    out
}
