//! Per-environment in-memory metadata index.
//!
//! An [`EnvironmentIndex`] is built once from a [`RawMetadata`] snapshot and is
//! immutable afterwards. It answers three kinds of questions, all
//! case-insensitively:
//!
//! - **Existence**: does a schema, table or column exist, optionally within a
//!   schema (tables) or a schema and table (columns)? O(1) per lookup.
//! - **Candidates**: which normalized names are in scope for fuzzy ranking?
//! - **Casing**: what was the original spelling of a normalized name or
//!   qualified path?
//!
//! # Invariants
//!
//! - Every normalized key has exactly one original casing, the first seen.
//! - Existence sets and candidate lists are the same ordered collection, so
//!   membership and enumeration always agree.
//! - Every schema in the snapshot has a (possibly empty) table scope, and
//!   every (schema, table) pair has a (possibly empty) column scope.
//! - A table declared twice under the same schema (names differing only in
//!   case) merges its columns into one scope.

mod level;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::error::LoadError;
use crate::source::SnapshotSource;
use crate::types::{normalize_name, normalize_segment, RawMetadata, Scope};

use level::{NameLevel, ScopedNames};

/// Load statistics for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct EnvironmentStats {
    pub is_loaded: bool,
    pub loaded_at: Option<DateTime<Utc>>,
    pub exported_at: Option<String>,
    pub schemas_count: usize,
    pub tables_count: usize,
    pub columns_count: usize,
}

/// A typeahead candidate: the bare name scored by the matcher and the
/// normalized dotted path used to recover display casing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchableCandidate {
    pub search_key: String,
    pub qualified_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct EnvironmentIndex {
    environment: String,

    schemas: NameLevel,
    tables: NameLevel,
    columns: NameLevel,

    tables_by_schema: IndexMap<String, ScopedNames>,
    columns_by_table: IndexMap<(String, String), ScopedNames>,

    qualified_tables: NameLevel,
    qualified_columns: NameLevel,

    exported_at: Option<String>,
    loaded_at: Option<DateTime<Utc>>,
}

fn qualify(parts: &[&str]) -> String {
    parts.join(".")
}

impl EnvironmentIndex {
    /// An empty, not yet loaded index.
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            ..Default::default()
        }
    }

    /// Builds a loaded index from a raw snapshot.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(environment = environment.as_ref()))
    )]
    pub fn build(environment: impl AsRef<str>, raw: &RawMetadata) -> Self {
        let mut index = Self::new(environment.as_ref());
        index.exported_at = raw.exported_at.clone();

        for (schema_name, schema) in &raw.schemas {
            let schema_key = normalize_name(schema_name);
            if schema_key.is_empty() {
                #[cfg(feature = "tracing")]
                tracing::debug!("skipping blank schema name");
                continue;
            }
            index.schemas.insert(&schema_key, schema_name);
            index
                .tables_by_schema
                .entry(schema_key.clone())
                .or_default();

            for (table_name, columns) in &schema.tables {
                let table_key = normalize_name(table_name);
                if table_key.is_empty() {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(schema = %schema_name, "skipping blank table name");
                    continue;
                }
                index.register_table(&schema_key, schema_name, &table_key, table_name);

                for column_name in columns {
                    let column_key = normalize_name(column_name);
                    if column_key.is_empty() {
                        continue;
                    }
                    index.register_column(
                        (&schema_key, schema_name),
                        (&table_key, table_name),
                        (&column_key, column_name),
                    );
                }
            }
        }

        index.loaded_at = Some(Utc::now());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            schemas = index.schemas.len(),
            tables = index.tables.len(),
            columns = index.columns.len(),
            "built environment index"
        );

        index
    }

    /// Fetches the environment's snapshot from `source` and builds an index.
    pub fn load_from(
        environment: impl AsRef<str>,
        source: &dyn SnapshotSource,
    ) -> Result<Self, LoadError> {
        let raw = source.fetch(environment.as_ref())?;
        Ok(Self::build(environment, &raw))
    }

    /// Replaces this index's contents with a fresh build of `raw`.
    ///
    /// The new state is built separately and moved in whole, so an index is
    /// never observed half built.
    pub fn load(&mut self, raw: &RawMetadata) {
        *self = Self::build(&self.environment, raw);
    }

    fn register_table(&mut self, schema_key: &str, schema_name: &str, table_key: &str, table_name: &str) {
        self.tables.insert(table_key, table_name);
        self.tables_by_schema
            .entry(schema_key.to_string())
            .or_default()
            .insert(table_key.to_string());
        self.columns_by_table
            .entry((schema_key.to_string(), table_key.to_string()))
            .or_default();
        self.qualified_tables.insert(
            &qualify(&[schema_key, table_key]),
            &qualify(&[schema_name, table_name]),
        );
    }

    fn register_column(
        &mut self,
        (schema_key, schema_name): (&str, &str),
        (table_key, table_name): (&str, &str),
        (column_key, column_name): (&str, &str),
    ) {
        self.columns.insert(column_key, column_name);
        self.columns_by_table
            .entry((schema_key.to_string(), table_key.to_string()))
            .or_default()
            .insert(column_key.to_string());
        self.qualified_columns.insert(
            &qualify(&[schema_key, table_key, column_key]),
            &qualify(&[schema_name, table_name, column_name]),
        );
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    pub fn exported_at(&self) -> Option<&str> {
        self.exported_at.as_deref()
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn stats(&self) -> EnvironmentStats {
        EnvironmentStats {
            is_loaded: self.is_loaded(),
            loaded_at: self.loaded_at,
            exported_at: self.exported_at.clone(),
            schemas_count: self.schema_count(),
            tables_count: self.table_count(),
            columns_count: self.column_count(),
        }
    }

    // === Existence ===

    pub fn schema_exists(&self, name: &str) -> bool {
        self.schema_exists_normalized(&normalize_name(name))
    }

    /// Table existence, scoped to `schema` when one is given.
    pub fn table_exists(&self, name: &str, schema: Option<&str>) -> bool {
        self.table_exists_normalized(&normalize_name(name), normalize_segment(schema).as_deref())
    }

    /// Column existence, scoped only when both `schema` and `table` are given.
    pub fn column_exists(&self, name: &str, schema: Option<&str>, table: Option<&str>) -> bool {
        self.column_exists_normalized(
            &normalize_name(name),
            normalize_segment(schema).as_deref(),
            normalize_segment(table).as_deref(),
        )
    }

    pub(crate) fn schema_exists_normalized(&self, name: &str) -> bool {
        self.schemas.contains(name)
    }

    pub(crate) fn table_exists_normalized(&self, name: &str, schema: Option<&str>) -> bool {
        match schema {
            Some(schema) => self
                .tables_by_schema
                .get(schema)
                .is_some_and(|tables| tables.contains(name)),
            None => self.tables.contains(name),
        }
    }

    pub(crate) fn column_exists_normalized(
        &self,
        name: &str,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> bool {
        match (schema, table) {
            (Some(schema), Some(table)) => self
                .columns_by_table
                .get(&(schema.to_string(), table.to_string()))
                .is_some_and(|columns| columns.contains(name)),
            _ => self.columns.contains(name),
        }
    }

    // === Casing ===

    pub fn original_schema(&self, normalized: &str) -> Option<&str> {
        self.schemas.original(normalized)
    }

    pub fn original_table(&self, normalized: &str) -> Option<&str> {
        self.tables.original(normalized)
    }

    pub fn original_column(&self, normalized: &str) -> Option<&str> {
        self.columns.original(normalized)
    }

    /// Original casing of a normalized bare name at `scope`.
    pub fn original_for_scope(&self, scope: Scope, normalized: &str) -> Option<&str> {
        match scope {
            Scope::Schema => self.original_schema(normalized),
            Scope::Table => self.original_table(normalized),
            Scope::Column => self.original_column(normalized),
        }
    }

    /// Original casing of a normalized qualified path (`schema`,
    /// `schema.table` or `schema.table.column` depending on `scope`).
    pub fn original_qualified(&self, scope: Scope, normalized: &str) -> Option<&str> {
        match scope {
            Scope::Schema => self.schemas.original(normalized),
            Scope::Table => self.qualified_tables.original(normalized),
            Scope::Column => self.qualified_columns.original(normalized),
        }
    }

    // === Candidates ===

    /// Normalized candidate names for fuzzy ranking, filtered exactly like the
    /// matching existence check.
    pub fn candidates_for_scope(
        &self,
        scope: Scope,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Vec<&str> {
        self.candidates_for_scope_normalized(
            scope,
            normalize_segment(schema).as_deref(),
            normalize_segment(table).as_deref(),
        )
    }

    pub(crate) fn candidates_for_scope_normalized(
        &self,
        scope: Scope,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Vec<&str> {
        match scope {
            Scope::Schema => self.schemas.names().collect(),
            Scope::Table => match schema {
                Some(schema) => self
                    .tables_by_schema
                    .get(schema)
                    .map(|tables| tables.iter().map(String::as_str).collect())
                    .unwrap_or_default(),
                None => self.tables.names().collect(),
            },
            Scope::Column => match (schema, table) {
                (Some(schema), Some(table)) => self
                    .columns_by_table
                    .get(&(schema.to_string(), table.to_string()))
                    .map(|columns| columns.iter().map(String::as_str).collect())
                    .unwrap_or_default(),
                _ => self.columns.names().collect(),
            },
        }
    }

    /// Typeahead candidates: bare names paired with their qualified paths.
    ///
    /// Each given segment filters independently: `schema` narrows tables and
    /// columns, `table` narrows columns with or without `schema`.
    pub fn searchable_candidates_for_scope(
        &self,
        scope: Scope,
        schema: Option<&str>,
        table: Option<&str>,
    ) -> Vec<SearchableCandidate> {
        let schema = normalize_segment(schema);
        let table = normalize_segment(table);
        let schema_matches = |s: &str| schema.as_deref().map_or(true, |wanted| wanted == s);
        let table_matches = |t: &str| table.as_deref().map_or(true, |wanted| wanted == t);

        match scope {
            Scope::Schema => self
                .schemas
                .names()
                .map(|name| SearchableCandidate {
                    search_key: name.to_string(),
                    qualified_name: name.to_string(),
                })
                .collect(),
            Scope::Table => self
                .tables_by_schema
                .iter()
                .filter(|(schema_key, _)| schema_matches(schema_key))
                .flat_map(|(schema_key, tables)| {
                    tables.iter().map(move |table_key| SearchableCandidate {
                        search_key: table_key.clone(),
                        qualified_name: qualify(&[schema_key, table_key]),
                    })
                })
                .collect(),
            Scope::Column => self
                .columns_by_table
                .iter()
                .filter(|((schema_key, table_key), _)| {
                    schema_matches(schema_key) && table_matches(table_key)
                })
                .flat_map(|((schema_key, table_key), columns)| {
                    columns.iter().map(move |column_key| SearchableCandidate {
                        search_key: column_key.clone(),
                        qualified_name: qualify(&[schema_key, table_key, column_key]),
                    })
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_metadata;

    fn sample_index() -> EnvironmentIndex {
        EnvironmentIndex::build("dev", &sample_metadata())
    }

    #[test]
    fn test_new_index_is_not_loaded() {
        let index = EnvironmentIndex::new("qa");
        assert!(!index.is_loaded());
        assert_eq!(index.environment(), "qa");
        assert_eq!(index.stats().schemas_count, 0);
    }

    #[test]
    fn test_exists_is_case_insensitive() {
        let index = sample_index();
        assert!(index.schema_exists("PUBLIC"));
        assert!(index.schema_exists(" public "));
        assert!(index.table_exists("Student", None));
        assert!(index.column_exists("EMAIL", None, None));
        assert!(!index.schema_exists("missing"));
    }

    #[test]
    fn test_table_exists_scoped_by_schema() {
        let index = sample_index();
        assert!(index.table_exists("order", Some("sales")));
        assert!(!index.table_exists("order", Some("hr")));
        assert!(!index.table_exists("order", Some("nope")));
        assert!(index.table_exists("order", None));
    }

    #[test]
    fn test_column_exists_scoped_only_with_schema_and_table() {
        let index = sample_index();
        assert!(index.column_exists("salary", Some("hr"), Some("employee")));
        assert!(!index.column_exists("salary", Some("public"), Some("student")));
        // Schema alone falls back to the global column set.
        assert!(index.column_exists("salary", Some("public"), None));
        assert!(index.column_exists("salary", None, Some("student")));
    }

    #[test]
    fn test_blank_context_is_ignored() {
        let index = sample_index();
        assert!(index.table_exists("order", Some("  ")));
    }

    #[test]
    fn test_original_casing_recovered() {
        let raw = RawMetadata::default().with_table("Sales", "OrderItem", ["Unit_Price"]);
        let index = EnvironmentIndex::build("dev", &raw);
        assert_eq!(index.original_schema("sales"), Some("Sales"));
        assert_eq!(index.original_table("orderitem"), Some("OrderItem"));
        assert_eq!(index.original_column("unit_price"), Some("Unit_Price"));
        assert_eq!(
            index.original_qualified(Scope::Table, "sales.orderitem"),
            Some("Sales.OrderItem")
        );
        assert_eq!(
            index.original_qualified(Scope::Column, "sales.orderitem.unit_price"),
            Some("Sales.OrderItem.Unit_Price")
        );
        assert_eq!(index.original_schema("Sales"), None);
    }

    #[test]
    fn test_first_casing_wins_across_tables() {
        let raw = RawMetadata::default()
            .with_table("public", "a", ["ID"])
            .with_table("public", "b", ["id"]);
        let index = EnvironmentIndex::build("dev", &raw);
        assert_eq!(index.original_column("id"), Some("ID"));
        assert_eq!(index.column_count(), 1);
        assert_eq!(
            index.original_qualified(Scope::Column, "public.b.id"),
            Some("public.b.id")
        );
    }

    #[test]
    fn test_redeclared_table_merges_columns() {
        let raw = RawMetadata::default()
            .with_table("public", "Student", ["id", "name"])
            .with_table("public", "STUDENT", ["name", "email"]);
        let index = EnvironmentIndex::build("dev", &raw);
        assert_eq!(
            index.candidates_for_scope(Scope::Column, Some("public"), Some("student")),
            ["id", "name", "email"]
        );
        assert_eq!(index.table_count(), 1);
        assert_eq!(index.original_table("student"), Some("Student"));
    }

    #[test]
    fn test_redeclared_schema_keeps_existing_tables() {
        let raw = RawMetadata::default()
            .with_table("Public", "student", ["id"])
            .with_table("PUBLIC", "course", ["id"]);
        let index = EnvironmentIndex::build("dev", &raw);
        assert_eq!(
            index.candidates_for_scope(Scope::Table, Some("public"), None),
            ["student", "course"]
        );
        assert_eq!(index.schema_count(), 1);
    }

    #[test]
    fn test_duplicate_columns_deduplicated() {
        let raw = RawMetadata::default().with_table("public", "t", ["Id", "ID", "name", "id"]);
        let index = EnvironmentIndex::build("dev", &raw);
        assert_eq!(
            index.candidates_for_scope(Scope::Column, Some("public"), Some("t")),
            ["id", "name"]
        );
        assert_eq!(index.original_column("id"), Some("Id"));
    }

    #[test]
    fn test_candidates_for_scope() {
        let index = sample_index();
        assert_eq!(
            index.candidates_for_scope(Scope::Schema, None, None),
            ["public", "hr", "sales"]
        );
        assert_eq!(
            index.candidates_for_scope(Scope::Table, Some("HR"), None),
            ["employee", "department"]
        );
        assert!(index
            .candidates_for_scope(Scope::Table, Some("missing"), None)
            .is_empty());
        assert_eq!(
            index.candidates_for_scope(Scope::Column, Some("hr"), Some("department")),
            ["id", "name", "location"]
        );
        // Schema only: global column list.
        assert_eq!(
            index.candidates_for_scope(Scope::Column, Some("hr"), None),
            index.candidates_for_scope(Scope::Column, None, None)
        );
    }

    #[test]
    fn test_global_lists_have_no_duplicates() {
        let index = sample_index();
        let columns = index.candidates_for_scope(Scope::Column, None, None);
        let unique: std::collections::HashSet<_> = columns.iter().collect();
        assert_eq!(unique.len(), columns.len());
        assert!(columns.iter().all(|c| index.column_exists(c, None, None)));
    }

    #[test]
    fn test_empty_schema_and_table_have_scopes() {
        let raw = RawMetadata::from_json(r#"{"schemas": {"empty": {"tables": {"t": []}}, "bare": {}}}"#)
            .unwrap();
        let index = EnvironmentIndex::build("dev", &raw);
        assert!(index.candidates_for_scope(Scope::Table, Some("bare"), None).is_empty());
        assert!(index
            .candidates_for_scope(Scope::Column, Some("empty"), Some("t"))
            .is_empty());
        assert!(index.table_exists("t", Some("empty")));
    }

    #[test]
    fn test_searchable_candidates_tables() {
        let index = sample_index();
        let all = index.searchable_candidates_for_scope(Scope::Table, None, None);
        assert_eq!(all.len(), 9);
        assert_eq!(all[0].search_key, "student");
        assert_eq!(all[0].qualified_name, "public.student");

        let hr = index.searchable_candidates_for_scope(Scope::Table, Some("hr"), None);
        let paths: Vec<_> = hr.iter().map(|c| c.qualified_name.as_str()).collect();
        assert_eq!(paths, ["hr.employee", "hr.department"]);
    }

    #[test]
    fn test_searchable_candidates_columns_filters() {
        let index = sample_index();
        let scoped = index.searchable_candidates_for_scope(Scope::Column, Some("hr"), Some("employee"));
        assert!(scoped
            .iter()
            .all(|c| c.qualified_name.starts_with("hr.employee.")));
        assert_eq!(scoped.len(), 4);

        let schema_only = index.searchable_candidates_for_scope(Scope::Column, Some("hr"), None);
        assert_eq!(schema_only.len(), 7);
        assert!(schema_only.iter().all(|c| c.qualified_name.starts_with("hr.")));

        let table_only = index.searchable_candidates_for_scope(Scope::Column, None, Some("customer"));
        assert!(table_only
            .iter()
            .all(|c| c.qualified_name.starts_with("sales.customer.")));
    }

    #[test]
    fn test_searchable_candidates_schemas() {
        let index = sample_index();
        let schemas = index.searchable_candidates_for_scope(Scope::Schema, None, None);
        assert!(schemas.iter().all(|c| c.search_key == c.qualified_name));
        assert_eq!(schemas.len(), 3);
    }

    #[test]
    fn test_load_replaces_state() {
        let mut index = sample_index();
        index.load(&RawMetadata::default().with_table("only", "t", ["c"]));
        assert_eq!(index.environment(), "dev");
        assert!(!index.schema_exists("public"));
        assert!(index.schema_exists("only"));
        assert_eq!(index.stats().tables_count, 1);
    }

    #[test]
    fn test_stats() {
        let index = sample_index();
        let stats = index.stats();
        assert!(stats.is_loaded);
        assert!(stats.loaded_at.is_some());
        assert_eq!(stats.exported_at.as_deref(), Some("2024-01-01T00:00:00"));
        assert_eq!(stats.schemas_count, 3);
        assert_eq!(stats.tables_count, 9);
    }
}
