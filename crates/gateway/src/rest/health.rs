//! Health check endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::state::GatewayState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

pub fn create_health_routes() -> Router<Arc<GatewayState>> {
    Router::new().route("/api/health", get(health))
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service and database are reachable", body = HealthResponse),
        (status = 500, description = "Database probe failed", body = crate::error::ErrorResponse)
    )
)]
pub async fn health(
    State(state): State<Arc<GatewayState>>,
) -> GatewayResult<Json<HealthResponse>> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        database: "ok".to_string(),
    }))
}
