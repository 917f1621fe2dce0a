//! HTTP surface
//!
//! All endpoints speak JSON and fail with a `{"error": "..."}` body and a
//! non-2xx status. Partial results from governor truncation are not
//! failures: they return a normal response whose metadata indicates the
//! reduced scope.

pub mod crd;
pub mod dependencies;

use crate::config::Config;
use crate::services::DependencyService;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DependencyService>,
    pub config: Arc<Config>,
}

/// API error taxonomy
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dependencies/graph", get(dependencies::get_graph))
        .route("/dependencies/graph/export", get(dependencies::export_graph))
        .route("/dependencies/crd/enhanced", get(crd::get_enhanced))
        .route("/dependencies/crd/export", get(crd::export_analysis))
        .route("/dependencies/crd/apigroups", get(crd::get_api_groups))
        .route(
            "/dependencies/:kind/:name",
            get(dependencies::get_resource_dependencies),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// GET /healthz - liveness probe
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
