//! Conversion of flat `schema,table,column` CSV exports into snapshots.

use std::io::Read;

use chrono::{SecondsFormat, Utc};

use crate::error::IngestError;
use crate::types::RawMetadata;

/// Header names identifying the three hierarchy levels in a CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    pub schema: String,
    pub table: String,
    pub column: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            schema: "schema".to_string(),
            table: "table".to_string(),
            column: "column".to_string(),
        }
    }
}

/// Result of a CSV conversion.
#[derive(Debug, Clone)]
pub struct CsvImport {
    pub metadata: RawMetadata,
    /// Rows that contributed an entry (blank rows excluded).
    pub rows: usize,
}

/// Builds a snapshot from a CSV export with one row per column.
///
/// Values are trimmed and rows with any blank level are skipped. A column
/// repeated verbatim within one table is kept once; names differing only in
/// case are left for the index to fold.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn metadata_from_csv<R: Read>(
    reader: R,
    columns: &CsvColumns,
) -> Result<CsvImport, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() || headers.iter().all(str::is_empty) {
        return Err(IngestError::NoHeaders);
    }

    let position = |name: &str| headers.iter().position(|header| header == name);
    let (schema_idx, table_idx, column_idx) = match (
        position(&columns.schema),
        position(&columns.table),
        position(&columns.column),
    ) {
        (Some(s), Some(t), Some(c)) => (s, t, c),
        (s, t, c) => {
            let missing = [
                (s, "schema", &columns.schema),
                (t, "table", &columns.table),
                (c, "column", &columns.column),
            ]
            .into_iter()
            .filter(|(found, _, _)| found.is_none())
            .map(|(_, level, name)| format!("{level} column '{name}'"))
            .collect();
            return Err(IngestError::MissingColumns {
                missing,
                available: headers.iter().map(str::to_string).collect(),
            });
        }
    };

    let mut metadata = RawMetadata::default();
    let mut rows = 0;
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or_default();
        let (schema, table, column) = (field(schema_idx), field(table_idx), field(column_idx));
        if schema.is_empty() || table.is_empty() || column.is_empty() {
            continue;
        }

        let table_columns = metadata
            .schemas
            .entry(schema.to_string())
            .or_default()
            .tables
            .entry(table.to_string())
            .or_default();
        if !table_columns.iter().any(|existing| existing == column) {
            table_columns.push(column.to_string());
        }
        rows += 1;
    }

    metadata.exported_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false));

    #[cfg(feature = "tracing")]
    tracing::debug!(rows, schemas = metadata.schemas.len(), "converted CSV export");

    Ok(CsvImport { metadata, rows })
}
