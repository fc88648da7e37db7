//! Two-stage name validation and typeahead suggestions.
//!
//! A [`Validator`] borrows a loaded [`EnvironmentIndex`] and carries no state
//! between calls. Validation first tries an exact, case-insensitive match
//! within the requested context; only on a miss does it rank the scoped
//! candidates with the [`FuzzyMatcher`].

use indexmap::IndexSet;

use crate::index::EnvironmentIndex;
use crate::matcher::FuzzyMatcher;
use crate::types::{
    normalize_name, normalize_segment, Scope, SuggestOptions, Suggestion, ValidationContext,
    ValidationResult,
};

#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    index: &'a EnvironmentIndex,
    matcher: FuzzyMatcher,
}

impl<'a> Validator<'a> {
    pub fn new(index: &'a EnvironmentIndex, matcher: FuzzyMatcher) -> Self {
        Self { index, matcher }
    }

    pub fn matcher(&self) -> &FuzzyMatcher {
        &self.matcher
    }

    /// Validates `term` at `scope`, optionally narrowed by `context`.
    ///
    /// Table scope honours the context schema; column scope honours the
    /// context only when both schema and table are present.
    pub fn validate(
        &self,
        scope: Scope,
        term: &str,
        context: Option<&ValidationContext>,
    ) -> ValidationResult {
        let term = normalize_name(term);
        if term.is_empty() {
            return ValidationResult::NotFound;
        }
        let schema = normalize_segment(context.and_then(|c| c.schema_name.as_deref()));
        let table = normalize_segment(context.and_then(|c| c.table_name.as_deref()));
        let (schema, table) = (schema.as_deref(), table.as_deref());

        if let Some(matched) = self.exact_match(scope, &term, schema, table) {
            return ValidationResult::Valid {
                matched: matched.to_string(),
            };
        }

        let candidates = self
            .index
            .candidates_for_scope_normalized(scope, schema, table);
        if candidates.is_empty() {
            return ValidationResult::NotFound;
        }

        let suggestions: Vec<Suggestion> = self
            .matcher
            .find_matches(&term, &candidates)
            .into_iter()
            .filter_map(|hit| {
                let original = self.index.original_for_scope(scope, &hit.name)?;
                Some(Suggestion::new(original, hit.score))
            })
            .collect();

        if suggestions.is_empty() {
            ValidationResult::NotFound
        } else {
            ValidationResult::Suggestions { suggestions }
        }
    }

    fn exact_match(
        &self,
        scope: Scope,
        term: &str,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Option<&'a str> {
        let exists = match scope {
            Scope::Schema => self.index.schema_exists_normalized(term),
            Scope::Table => self.index.table_exists_normalized(term, schema),
            Scope::Column => self.index.column_exists_normalized(term, schema, table),
        };
        if !exists {
            return None;
        }
        self.index.original_for_scope(scope, term)
    }

    /// Typeahead: ranks bare object names and returns their qualified display
    /// names (`schema`, `schema.table` or `schema.table.column`).
    ///
    /// Every given segment in `options` narrows the candidates. Results are
    /// deduplicated by display name, best score first, before the limit
    /// applies.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, options), level = "debug"))]
    pub fn suggest(&self, scope: Scope, query: &str, options: &SuggestOptions) -> Vec<Suggestion> {
        let candidates = self.index.searchable_candidates_for_scope(
            scope,
            options.schema.as_deref(),
            options.table.as_deref(),
        );
        if candidates.is_empty() {
            return Vec::new();
        }
        let keys: Vec<&str> = candidates.iter().map(|c| c.search_key.as_str()).collect();
        let limit = options.limit.unwrap_or(self.matcher.max_results());

        let hits = self
            .matcher
            .find_matches_with(query, &keys, options.threshold, Some(usize::MAX));

        let mut seen = IndexSet::new();
        let mut suggestions = Vec::new();
        for hit in hits {
            if suggestions.len() >= limit {
                break;
            }
            let qualified = &candidates[hit.index].qualified_name;
            let Some(display) = self.index.original_qualified(scope, qualified) else {
                continue;
            };
            if seen.insert(display) {
                suggestions.push(Suggestion::new(display, hit.score));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(count = suggestions.len(), "typeahead suggestions");

        suggestions
    }
}
