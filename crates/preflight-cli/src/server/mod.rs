//! HTTP server module for serve mode.
//!
//! This module runs the validation service: a small JSON API over the
//! index registry, with optional hot reload of snapshot files.

pub mod api;
pub mod state;
mod watcher;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

pub use state::{AppState, ServerConfig};

/// Route prefix of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// Run the HTTP server.
///
/// This function blocks until the server is shut down (e.g., via Ctrl+C).
pub async fn run_server(config: ServerConfig) -> Result<()> {
    let addr = config.socket_addr()?;

    // Snapshot loading is blocking file I/O.
    let state = tokio::task::spawn_blocking(move || AppState::new(config))
        .await
        .context("Failed to load metadata snapshots")?;
    let state = Arc::new(state);

    let watcher_handle = state.config.watch.then(|| {
        let watcher_state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = watcher::start_watcher(watcher_state).await {
                tracing::error!("watcher error: {e:#}");
            }
        })
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    tracing::info!("server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(handle) = watcher_handle {
        handle.abort();
    }
    tracing::info!("server stopped");

    Ok(())
}

/// Build the main router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest(API_PREFIX, api::api_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// GET / - Service information
async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "service": "preflight",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Pre-validation service for database object names",
        "available_environments": state.registry.available_environments(),
        "health": format!("{API_PREFIX}/validate/health"),
        "environments": format!("{API_PREFIX}/validate/environments"),
    }))
}

/// GET /health - Basic liveness with degraded state when nothing is loaded
async fn health(State(state): State<Arc<AppState>>) -> Json<api::HealthResponse> {
    Json(api::HealthResponse {
        status: if state.registry.is_any_loaded() {
            "healthy"
        } else {
            "degraded"
        },
        available_environments: state.registry.available_environments(),
        environments: None,
    })
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
}
