//! REST API handlers for the roster optimizer.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::demo_data::{self, DemoData};
use crate::dto::{HealthResponse, InfoResponse, OptimizeRequest, OptimizeResponse};
use crate::error::RosterError;
use crate::optimize;
use crate::solver::ConstraintSolver;

/// Application state shared across handlers.
///
/// Requests are independent, so nothing here is mutable.
pub struct AppState {
    pub config: ServiceConfig,
    pub solver: Arc<dyn ConstraintSolver>,
}

impl AppState {
    pub fn new(config: ServiceConfig, solver: Arc<dyn ConstraintSolver>) -> Self {
        Self { config, solver }
    }
}

// ============================================================================
// Router and Handlers
// ============================================================================

/// Creates the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health & Info
        .route("/health", get(health))
        .route("/info", get(info))
        // Demo data
        .route("/demo-data", get(list_demo_data))
        .route("/demo-data/{id}", get(get_demo_data))
        // Optimization
        .route("/optimize", post(optimize_roster))
        .with_state(state)
}

// ============================================================================
// Health & Info
// ============================================================================

/// GET /health - Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        solver: state.solver.name().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /info - Application info endpoint.
async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "Roster Optimizer",
        version: env!("CARGO_PKG_VERSION"),
        solver_engine: state.solver.name(),
    })
}

/// GET /demo-data - List available demo data sets.
async fn list_demo_data() -> Json<Vec<&'static str>> {
    Json(demo_data::list_demo_data())
}

/// GET /demo-data/{id} - Get a ready-to-post optimize request.
async fn get_demo_data(Path(id): Path<String>) -> Result<Json<OptimizeRequest>, StatusCode> {
    match id.parse::<DemoData>() {
        Ok(demo) => Ok(Json(demo_data::generate(demo))),
        Err(_) => Err(StatusCode::NOT_FOUND),
    }
}

// ============================================================================
// Optimize
// ============================================================================

/// POST /optimize - Solve a roster request synchronously.
///
/// The solve runs on the blocking pool; the response arrives once the
/// primary solve (and any relaxed re-solve) has finished.
async fn optimize_roster(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Json<OptimizeResponse>, RosterError> {
    let Json(request) = payload.map_err(|e| RosterError::InvalidRequest(e.body_text()))?;
    let ctx = state.config.context(Uuid::new_v4());
    let solver = Arc::clone(&state.solver);

    let response = tokio::task::spawn_blocking(move || {
        optimize::optimize(&request, &ctx, solver.as_ref())
    })
    .await??;

    Ok(Json(response))
}

impl IntoResponse for RosterError {
    fn into_response(self) -> Response {
        let status = match &self {
            RosterError::InvalidRequest(_) => {
                warn!(error = %self, "Rejected optimize request");
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => {
                error!(error = %self, "Optimize failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(OptimizeResponse::error(self.to_string()))).into_response()
    }
}
