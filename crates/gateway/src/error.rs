//! Error types for the gateway layer.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use outreach_auth::AuthError;
use outreach_database::StoreError;
use outreach_messaging::MessagingError;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// Gateway error types, one variant per status class.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Database(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Error body shape, for the OpenAPI document.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl From<MessagingError> for GatewayError {
    fn from(error: MessagingError) -> Self {
        match error {
            MessagingError::Validation { message } => GatewayError::Validation(message),
            MessagingError::AccessDenied { reason } => GatewayError::Forbidden(reason),
            MessagingError::MessageNotFound { id } => {
                GatewayError::NotFound(format!("message not found: {id}"))
            }
            MessagingError::ChannelNotFound { id } => {
                GatewayError::NotFound(format!("channel not found: {id}"))
            }
            MessagingError::UserNotFound { id } => {
                GatewayError::NotFound(format!("user not found: {id}"))
            }
            MessagingError::ParticipantNotFound => {
                GatewayError::NotFound("not a participant of this channel".to_string())
            }
            MessagingError::Store(e) => e.into(),
            MessagingError::Auth(e) => e.into(),
        }
    }
}

impl From<StoreError> for GatewayError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::MessageNotFound { .. }
            | StoreError::ChannelNotFound { .. }
            | StoreError::UserNotFound { .. }
            | StoreError::ParticipantNotFound => GatewayError::NotFound(error.to_string()),
            StoreError::ParticipantExists => GatewayError::Validation(error.to_string()),
            other => GatewayError::Database(other.to_string()),
        }
    }
}

impl From<AuthError> for GatewayError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::UserExists => GatewayError::Validation("user already exists".to_string()),
            AuthError::InvalidCredentials => {
                GatewayError::Unauthenticated("invalid credentials".to_string())
            }
            AuthError::SessionNotFound
            | AuthError::SessionExpired
            | AuthError::InvalidSession => GatewayError::Unauthenticated(error.to_string()),
            AuthError::Database(e) => GatewayError::Database(e.to_string()),
            AuthError::PasswordHash(_) => {
                GatewayError::Internal("password hashing failed".to_string())
            }
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(error: sqlx::Error) -> Self {
        GatewayError::Database(error.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::Internal(format!("serialization error: {error}"))
    }
}
