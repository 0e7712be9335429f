//! Authentication REST endpoints.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{routing::get, routing::post, Json, Router};
use outreach_auth::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::GatewayResult;
use crate::rest::require_bearer;
use crate::state::GatewayState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.public_id,
            email: user.email,
            display_name: user.display_name,
            role: user.role.as_str().to_string(),
        }
    }
}

pub fn create_auth_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid request or user exists", body = crate::error::ErrorResponse)
    )
)]
pub async fn register(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<RegisterRequest>,
) -> GatewayResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .authenticator
        .register_with_password(&payload.email, &payload.password, payload.display_name.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    Json(payload): Json<LoginRequest>,
) -> GatewayResult<Json<SessionResponse>> {
    let session = state
        .authenticator
        .login_with_password(&payload.email, &payload.password)
        .await?;

    Ok(Json(SessionResponse {
        token: session.token,
        expires_at: session.expires_at.to_rfc3339(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid session", body = crate::error::ErrorResponse)
    )
)]
pub async fn me(
    State(state): State<Arc<GatewayState>>,
    headers: HeaderMap,
) -> GatewayResult<Json<UserResponse>> {
    let user = require_bearer(&state, &headers).await?;
    Ok(Json(user.into()))
}
