//! File system watcher for metadata snapshots.
//!
//! This module watches the data directory for changes to
//! `metadata_<env>.json` files and rebuilds the affected environment.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode, DebouncedEventKind};
use preflight_core::environment_from_path;

use super::AppState;

/// Debounce duration for file system events.
///
/// Snapshot exporters typically write in several chunks; waiting half a
/// second avoids parsing a half-written file.
const DEBOUNCE_DURATION: Duration = Duration::from_millis(500);

/// Configured environments whose snapshot file is among `paths`.
fn changed_environments<'a, I>(paths: I, state: &AppState) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Path>,
{
    paths
        .into_iter()
        .filter_map(environment_from_path)
        .filter(|env| state.registry.is_configured(env))
        .map(str::to_string)
        .collect()
}

/// Start watching the data directory for snapshot changes.
///
/// This function runs until the task is cancelled. Changes are debounced
/// and each affected environment is reloaded independently.
pub async fn start_watcher(state: Arc<AppState>) -> Result<()> {
    let data_dir = state.config.data_dir.clone();
    if !data_dir.exists() {
        tracing::warn!("data directory {} does not exist; not watching", data_dir.display());
        return Ok(());
    }

    let (tx, mut rx) = tokio::sync::mpsc::channel(16);

    let mut debouncer = new_debouncer(DEBOUNCE_DURATION, move |result| {
        if let Err(e) = tx.blocking_send(result) {
            tracing::warn!("failed to send file event: {e}");
        }
    })
    .map_err(|e| anyhow::anyhow!("Failed to create file watcher: {e}"))?;

    debouncer
        .watcher()
        .watch(&data_dir, RecursiveMode::NonRecursive)
        .map_err(|e| anyhow::anyhow!("Failed to watch {}: {e}", data_dir.display()))?;
    tracing::info!("watching {}", data_dir.display());

    while let Some(result) = rx.recv().await {
        match result {
            Ok(events) => {
                let paths = events
                    .iter()
                    .filter(|event| {
                        matches!(
                            event.kind,
                            DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous
                        )
                    })
                    .map(|event| event.path.as_path());

                for environment in changed_environments(paths, &state) {
                    tracing::info!(environment = %environment, "snapshot changed");
                    let reload_state = Arc::clone(&state);
                    let env = environment.clone();
                    let outcome =
                        tokio::task::spawn_blocking(move || reload_state.reload(&env)).await;
                    match outcome {
                        Ok(Ok(index)) => tracing::info!(
                            environment = %environment,
                            schemas = index.schema_count(),
                            tables = index.table_count(),
                            "reloaded"
                        ),
                        Ok(Err(e)) => tracing::warn!(
                            environment = %environment,
                            "reload failed, keeping previous index: {e}"
                        ),
                        Err(e) => tracing::error!(environment = %environment, "reload task failed: {e}"),
                    }
                }
            }
            Err(error) => {
                tracing::warn!("watcher error: {error}");
            }
        }
    }

    Ok(())
}
