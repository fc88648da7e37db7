//! CLI argument parsing using clap.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use preflight_core::{FileSnapshotSource, FuzzyMatcher, IndexRegistry, Scope};

/// Invalid invocation settings, reported with the configuration exit code.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no environments configured")]
    NoEnvironments,
}

/// Preflight - validate database object names before you query
#[derive(Parser, Debug)]
#[command(name = "preflight")]
#[command(
    about = "Validate schema, table and column names against metadata snapshots",
    long_about = None
)]
#[command(version)]
pub struct Args {
    #[command(flatten)]
    pub shared: SharedArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug, Clone)]
pub struct SharedArgs {
    /// Directory holding metadata_<env>.json snapshots
    #[arg(long, global = true, env = "PREFLIGHT_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Comma-separated list of recognized environments
    #[arg(
        long,
        global = true,
        env = "PREFLIGHT_ENVIRONMENTS",
        default_value = "prod,stage,qa,dev",
        value_delimiter = ','
    )]
    pub environments: Vec<String>,

    /// Minimum similarity score for suggestions (0-100)
    #[arg(
        long,
        global = true,
        env = "PREFLIGHT_FUZZY_THRESHOLD",
        default_value_t = preflight_core::DEFAULT_THRESHOLD,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub threshold: u8,

    /// Maximum number of suggestions returned
    #[arg(
        long,
        global = true,
        env = "PREFLIGHT_MAX_SUGGESTIONS",
        default_value_t = preflight_core::DEFAULT_MAX_RESULTS,
        value_parser = parse_limit
    )]
    pub limit: usize,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate one name (exit 0 valid, 1 suggestions, 2 not found)
    Check(CheckArgs),

    /// Typeahead suggestions returning qualified names
    Suggest(SuggestArgs),

    /// Show load status and counts for every configured environment
    Stats {
        /// Output format
        #[arg(short, long, default_value = "text", value_enum)]
        format: OutputFormat,
    },

    /// Convert a schema,table,column CSV export into a JSON snapshot
    Convert(ConvertArgs),

    /// Print the JSON Schema of the snapshot and API types
    Schema,

    /// Start the HTTP validation service
    #[cfg(feature = "serve")]
    Serve(ServeArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Level to validate: schema, table or column
    pub scope: Scope,

    /// The name to validate
    pub name: String,

    /// Schema context for table and column scope
    pub schema: Option<String>,

    /// Table context for column scope
    pub table: Option<String>,

    /// Environment whose snapshot is consulted
    #[arg(short, long, default_value = "dev")]
    pub env: String,

    /// Read this snapshot file instead of <data-dir>/metadata_<env>.json
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SuggestArgs {
    /// Level to search: schema, table or column
    pub scope: Scope,

    /// Partial name as typed
    pub query: String,

    /// Only suggest objects within this schema
    #[arg(long)]
    pub schema: Option<String>,

    /// Only suggest columns of this table
    #[arg(long)]
    pub table: Option<String>,

    /// Environment whose snapshot is consulted
    #[arg(short, long, default_value = "dev")]
    pub env: String,

    /// Include similarity scores
    #[arg(long)]
    pub scores: bool,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConvertArgs {
    /// CSV file with one row per column
    pub csv: PathBuf,

    /// Environment the snapshot is for
    pub env: String,

    /// Output path (defaults to <data-dir>/metadata_<env>.json)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Header of the schema column
    #[arg(long, default_value = "schema")]
    pub schema_col: String,

    /// Header of the table column
    #[arg(long, default_value = "table")]
    pub table_col: String,

    /// Header of the column-name column
    #[arg(long, default_value = "column")]
    pub column_col: String,
}

#[cfg(feature = "serve")]
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "PREFLIGHT_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port for HTTP server
    #[arg(long, env = "PREFLIGHT_PORT", default_value = "8000")]
    pub port: u16,

    /// Reload snapshots when files in the data directory change
    #[arg(long)]
    pub watch: bool,

    /// Log filter, e.g. info or preflight_core=debug
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

fn parse_limit(value: &str) -> Result<usize, String> {
    let limit: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a positive integer"))?;
    if limit == 0 {
        return Err("limit must be at least 1".to_string());
    }
    Ok(limit)
}

impl SharedArgs {
    /// Configured environments, trimmed, with blanks dropped.
    pub fn environment_names(&self) -> Result<Vec<String>> {
        let names: Vec<String> = self
            .environments
            .iter()
            .map(|env| env.trim().to_string())
            .filter(|env| !env.is_empty())
            .collect();
        if names.is_empty() {
            bail!(ConfigError::NoEnvironments);
        }
        Ok(names)
    }

    pub fn matcher(&self) -> FuzzyMatcher {
        FuzzyMatcher::new(self.threshold, self.limit)
    }

    pub fn source(&self) -> FileSnapshotSource {
        FileSnapshotSource::new(&self.data_dir)
    }

    /// An empty registry over the configured environments.
    pub fn registry(&self) -> Result<IndexRegistry> {
        Ok(IndexRegistry::new(self.environment_names()?))
    }
}
