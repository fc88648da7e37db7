//! REST API handlers for the validation service.
//!
//! Endpoints are mounted under `/api/v1`. Errors are returned as
//! `{"detail": "..."}` with a 4xx/5xx status.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use indexmap::IndexMap;
use preflight_core::{
    EnvironmentStats, LoadStatus, Scope, ServiceError, SuggestOptions, Suggestion,
    ValidationRequest, ValidationResponse, Validator,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::AppState;

/// Shortest typeahead query accepted.
const MIN_QUERY_LEN: usize = 2;
const MAX_QUERY_LEN: usize = 100;
/// Largest typeahead limit accepted.
const MAX_SUGGEST_LIMIT: usize = 20;

/// Build the API router with all endpoints.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/validate", post(validate))
        .route("/validate/health", get(validation_health))
        .route("/validate/environments", get(environments))
        .route("/suggest", get(suggest))
        .route("/suggest/with-scores", get(suggest_with_scores))
}

// === Errors ===

/// An error response rendered as `{"detail": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match err {
            ServiceError::NoIndexLoaded => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::UnknownEnvironment { .. } => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

// === Request/Response types ===

#[derive(Serialize)]
pub(super) struct HealthResponse {
    pub(super) status: &'static str,
    pub(super) available_environments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) environments: Option<IndexMap<String, EnvironmentStats>>,
}

#[derive(Serialize)]
struct EnvironmentsResponse {
    available: Vec<String>,
    details: IndexMap<String, EnvironmentStats>,
    status: IndexMap<String, LoadStatus>,
}

#[derive(Debug, Deserialize)]
struct SuggestQuery {
    environment: String,
    scope: Scope,
    q: String,
    #[serde(default)]
    schema_name: Option<String>,
    #[serde(default)]
    table_name: Option<String>,
    #[serde(default)]
    threshold: Option<u8>,
    #[serde(default)]
    limit: Option<usize>,
}

impl SuggestQuery {
    /// Range checks matching the service's documented limits.
    fn check(&self) -> Result<(), ApiError> {
        let len = self.q.chars().count();
        if !(MIN_QUERY_LEN..=MAX_QUERY_LEN).contains(&len) {
            return Err(ApiError::unprocessable(format!(
                "q must be between {MIN_QUERY_LEN} and {MAX_QUERY_LEN} characters"
            )));
        }
        if self.threshold.is_some_and(|t| t > 100) {
            return Err(ApiError::unprocessable("threshold must be between 0 and 100"));
        }
        if self.limit.is_some_and(|l| l == 0 || l > MAX_SUGGEST_LIMIT) {
            return Err(ApiError::unprocessable(format!(
                "limit must be between 1 and {MAX_SUGGEST_LIMIT}"
            )));
        }
        Ok(())
    }

    fn options(&self) -> SuggestOptions {
        SuggestOptions {
            schema: self.schema_name.clone(),
            table: self.table_name.clone(),
            threshold: self.threshold,
            limit: self.limit,
        }
    }
}

// === Handlers ===

/// POST /api/v1/validate - Validate one object name
async fn validate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ValidationRequest>, JsonRejection>,
) -> Result<Json<ValidationResponse>, ApiError> {
    let Json(request) = payload?;
    if request.search_term.is_empty() {
        return Err(ApiError::unprocessable("search_term must not be empty"));
    }

    let index = state.registry.require(&request.environment)?;
    let validator = Validator::new(&index, state.config.matcher);
    let result = validator.validate(request.scope, &request.search_term, request.context.as_ref());

    tracing::debug!(
        environment = %request.environment,
        scope = %request.scope,
        term = %request.search_term,
        status = ?result.status(),
        "validated"
    );

    Ok(Json(result.into()))
}

/// GET /api/v1/validate/health - Load state of every environment
async fn validation_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let registry = &state.registry;
    Json(HealthResponse {
        status: if registry.is_any_loaded() {
            "healthy"
        } else {
            "loading"
        },
        available_environments: registry.available_environments(),
        environments: Some(registry.stats_for_all()),
    })
}

/// GET /api/v1/validate/environments - Loaded environments and their statistics
async fn environments(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let registry = &state.registry;
    Json(EnvironmentsResponse {
        available: registry.available_environments(),
        details: registry.stats_for_all(),
        status: registry.load_status(),
    })
}

fn run_suggest(
    state: &AppState,
    query: Result<Query<SuggestQuery>, QueryRejection>,
) -> Result<Vec<Suggestion>, ApiError> {
    let Query(query) = query?;
    query.check()?;

    let index = state.registry.get(&query.environment).ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("Environment '{}' not available.", query.environment),
        )
    })?;

    let validator = Validator::new(&index, state.config.matcher);
    Ok(validator.suggest(query.scope, &query.q, &query.options()))
}

/// GET /api/v1/suggest - Typeahead returning qualified names
async fn suggest(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SuggestQuery>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let suggestions = run_suggest(&state, query)?;
    Ok(Json(suggestions.into_iter().map(|s| s.name).collect()))
}

/// GET /api/v1/suggest/with-scores - Typeahead with similarity scores
async fn suggest_with_scores(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SuggestQuery>, QueryRejection>,
) -> Result<Json<Vec<Suggestion>>, ApiError> {
    Ok(Json(run_suggest(&state, query)?))
}
