//! REST API endpoints for the gateway.

pub mod auth;
pub mod channels;
pub mod health;
pub mod messaging;

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use axum::Router;
use outreach_auth::User;

use crate::error::{GatewayError, GatewayResult};
use crate::state::GatewayState;

/// Create all REST API routes.
pub fn create_rest_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .merge(auth::create_auth_routes())
        .merge(channels::create_channel_routes())
        .merge(health::create_health_routes())
        .merge(messaging::create_messaging_routes())
}

/// Authenticate the caller from the `Authorization: Bearer` header.
pub(crate) async fn require_bearer(
    state: &GatewayState,
    headers: &HeaderMap,
) -> GatewayResult<User> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| GatewayError::Unauthenticated("missing bearer token".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| GatewayError::Unauthenticated("malformed authorization header".to_string()))?;

    let (user, _session) = state.authenticator.authenticate_token(token).await?;
    Ok(user)
}
