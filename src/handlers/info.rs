use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::error::ApiError;

#[derive(Debug, Serialize, ToSchema)]
pub struct InfoResponse {
    pub name: String,
    pub version: String,
}

/// GET /api/internal/info
#[utoipa::path(
    get,
    path = "/api/internal/info",
    tag = "internal",
    responses((status = 200, description = "Service name and version", body = InfoResponse))
)]
pub async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    Json(InfoResponse {
        name: state.config.app_name.clone(),
        version: state.config.app_version.clone(),
    })
}

/// GET /api/internal/health - plain "OK", or a 503 envelope when the store is unreachable
#[utoipa::path(
    get,
    path = "/api/internal/health",
    tag = "internal",
    responses(
        (status = 200, description = "Store reachable", body = String),
        (status = 503, description = "Store unreachable"),
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.health.ping().await.map_err(|e| {
        warn!(error = %e, "Health check failed");
        ApiError::service_unavailable("DOWN")
    })?;
    Ok("OK")
}
