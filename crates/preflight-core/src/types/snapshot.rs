//! Raw hierarchical metadata as exported by snapshot tooling.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A full metadata snapshot for one environment.
///
/// Maps preserve document order, which is the "first seen" order used for
/// candidate enumeration and tie breaking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RawMetadata {
    /// Schema name (original casing) to its tables.
    #[serde(default)]
    pub schemas: IndexMap<String, RawSchema>,

    /// Opaque export timestamp supplied by the exporter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,

    /// Environment the snapshot was exported for, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Tables of a single schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RawSchema {
    /// Table name (original casing) to its ordered column names.
    #[serde(default)]
    pub tables: IndexMap<String, Vec<String>>,
}

/// Raw element counts of a snapshot, before any deduplication.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawCounts {
    pub schemas: usize,
    pub tables: usize,
    pub columns: usize,
}

impl RawMetadata {
    /// Parses a JSON snapshot document.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Builder-style helper used when assembling snapshots in code.
    pub fn with_table<S, T, C>(mut self, schema: S, table: T, columns: C) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        let tables = &mut self.schemas.entry(schema.into()).or_default().tables;
        tables
            .entry(table.into())
            .or_default()
            .extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn counts(&self) -> RawCounts {
        let tables = self.schemas.values().map(|s| s.tables.len()).sum();
        let columns = self
            .schemas
            .values()
            .flat_map(|s| s.tables.values())
            .map(Vec::len)
            .sum();
        RawCounts {
            schemas: self.schemas.len(),
            tables,
            columns,
        }
    }
}
