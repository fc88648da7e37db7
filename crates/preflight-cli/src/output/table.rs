//! Tabular output for `stats`.

use owo_colors::OwoColorize;
use preflight_core::{IndexRegistry, LoadStatus};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// One row of the environment overview.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct EnvironmentRow {
    #[tabled(rename = "Environment")]
    pub environment: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Schemas")]
    pub schemas: usize,
    #[tabled(rename = "Tables")]
    pub tables: usize,
    #[tabled(rename = "Columns")]
    pub columns: usize,
    #[tabled(rename = "Exported")]
    pub exported_at: String,
    #[tabled(skip)]
    #[serde(skip)]
    loaded: bool,
}

impl EnvironmentRow {
    /// Rows for every configured environment, in configured order.
    pub fn collect(registry: &IndexRegistry) -> Vec<Self> {
        let stats = registry.stats_for_all();
        registry
            .load_status()
            .into_iter()
            .map(|(environment, status)| {
                let env_stats = stats.get(&environment);
                Self {
                    loaded: matches!(status, LoadStatus::Loaded { .. }),
                    status: status.to_string(),
                    schemas: env_stats.map_or(0, |s| s.schemas_count),
                    tables: env_stats.map_or(0, |s| s.tables_count),
                    columns: env_stats.map_or(0, |s| s.columns_count),
                    exported_at: env_stats
                        .and_then(|s| s.exported_at.clone())
                        .unwrap_or_else(|| "-".to_string()),
                    environment,
                }
            })
            .collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

/// Render the environment overview as a table, followed by a one-line summary.
pub fn format_stats(rows: &[EnvironmentRow], colored: bool) -> String {
    let mut out = Table::new(rows).with(Style::rounded()).to_string();
    out.push('\n');

    let loaded = rows.iter().filter(|row| row.is_loaded()).count();
    let summary = format!("{loaded} of {} environment(s) loaded", rows.len());
    if !colored {
        out.push_str(&summary);
    } else if loaded == 0 {
        out.push_str(&summary.red().to_string());
    } else {
        out.push_str(&summary.green().to_string());
    }
    out.push('\n');
    out
}
