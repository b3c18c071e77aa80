//! HTTP route handlers.

use axum::{
    Form, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tracing::warn;

use crate::domain::Time;
use crate::planner::{PlanError, Planner, Query};

use super::dto::{journeys_response, CalculateRequest, CalculateResponse, ErrorResponse};
use super::state::AppState;

/// Create the application router.
///
/// `static_dir` is the path to the static front-end directory, served at
/// the root.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/calculate", post(calculate))
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Compute Pareto-optimal journeys between two named stops.
async fn calculate(
    State(state): State<AppState>,
    Form(req): Form<CalculateRequest>,
) -> Result<Json<CalculateResponse>, AppError> {
    let origin = state
        .names
        .resolve(&req.start)
        .ok_or_else(AppError::invalid_stop_name)?;
    let destination = state
        .names
        .resolve(&req.end)
        .ok_or_else(AppError::invalid_stop_name)?;
    let departure = Time::parse_hm(&req.time).map_err(|_| AppError::BadRequest {
        message: format!("Invalid time: {}", req.time),
    })?;

    let query = Query {
        origin,
        destination,
        departure,
    };

    // The search is CPU-bound; keep it off the async runtime.
    let timetable = state.timetable.clone();
    let config = state.config.clone();
    let response = tokio::task::spawn_blocking(move || {
        let planner = Planner::new(&timetable, &config);
        let result = planner.plan(&query)?;
        Ok::<_, PlanError>(journeys_response(&timetable, origin, destination, &result))
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("planner task failed: {e}"),
    })??;

    Ok(Json(response))
}

/// Error responses from route handlers.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Internal { message: String },
}

impl AppError {
    /// The contract error for an unresolvable stop name.
    fn invalid_stop_name() -> Self {
        AppError::BadRequest {
            message: "Invalid stop name".to_string(),
        }
    }
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            // Stop ids only enter a query through the name index, so an
            // unknown id past that point is an internal inconsistency.
            PlanError::UnknownStop(_) => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
