//! `preflight convert`: CSV export to JSON snapshot.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use preflight_core::{metadata_from_csv, snapshot_file_name, CsvColumns, CsvImport};

use crate::cli::ConvertArgs;

/// Result of writing a snapshot.
#[derive(Debug)]
pub struct ConvertOutcome {
    pub import: CsvImport,
    pub output: PathBuf,
}

/// Converts `args.csv` and writes the snapshot, creating parent directories.
pub fn convert(args: &ConvertArgs, data_dir: &Path) -> Result<ConvertOutcome> {
    let file = File::open(&args.csv)
        .with_context(|| format!("Failed to open {}", args.csv.display()))?;
    let columns = CsvColumns {
        schema: args.schema_col.clone(),
        table: args.table_col.clone(),
        column: args.column_col.clone(),
    };

    let mut import = metadata_from_csv(file, &columns)
        .with_context(|| format!("Failed to convert {}", args.csv.display()))?;
    import.metadata.environment = Some(args.env.clone());

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| data_dir.join(snapshot_file_name(&args.env)));
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(&import.metadata)?;
    fs::write(&output, json).with_context(|| format!("Failed to write {}", output.display()))?;

    Ok(ConvertOutcome { import, output })
}

/// Summary printed after a successful conversion.
pub fn format_outcome(outcome: &ConvertOutcome) -> String {
    let counts = outcome.import.metadata.counts();
    let mut out = String::new();
    let _ = writeln!(out, "preflight: wrote {}", outcome.output.display());
    let _ = writeln!(out, "  Rows:    {}", outcome.import.rows);
    let _ = writeln!(out, "  Schemas: {}", counts.schemas);
    let _ = writeln!(out, "  Tables:  {}", counts.tables);
    let _ = writeln!(out, "  Columns: {}", counts.columns);

    let schemas = &outcome.import.metadata.schemas;
    if !schemas.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Sample:");
        for (schema, raw_schema) in schemas.iter().take(3) {
            let tables: Vec<&str> = raw_schema.tables.keys().take(5).map(String::as_str).collect();
            let more = raw_schema.tables.len().saturating_sub(tables.len());
            let _ = write!(out, "  {schema}: {}", tables.join(", "));
            if more > 0 {
                let _ = write!(out, " (+{more} more)");
            }
            let _ = writeln!(out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(csv: PathBuf, output: Option<PathBuf>) -> ConvertArgs {
        ConvertArgs {
            csv,
            env: "qa".to_string(),
            output,
            schema_col: "schema".to_string(),
            table_col: "table".to_string(),
            column_col: "column".to_string(),
        }
    }

    #[test]
    fn test_convert_writes_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("export.csv");
        fs::write(&csv, "schema,table,column\npublic,student,id\npublic,student,email\n").unwrap();

        let data_dir = dir.path().join("nested").join("data");
        let outcome = convert(&args(csv, None), &data_dir).unwrap();
        assert_eq!(outcome.output, data_dir.join("metadata_qa.json"));

        let written = fs::read_to_string(&outcome.output).unwrap();
        let raw = preflight_core::RawMetadata::from_json(&written).unwrap();
        assert_eq!(raw.schemas["public"].tables["student"], ["id", "email"]);
        assert_eq!(raw.environment.as_deref(), Some("qa"));

        let summary = format_outcome(&outcome);
        assert!(summary.contains("Rows:    2"));
        assert!(summary.contains("  public: student"));
    }

    #[test]
    fn test_convert_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = convert(&args(dir.path().join("nope.csv"), None), dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to open"));
    }
}
