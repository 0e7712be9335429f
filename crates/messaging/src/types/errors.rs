//! Error types for the messaging subsystem.

use outreach_auth::AuthError;
use outreach_database::StoreError;
use thiserror::Error;

/// Main error type for messaging operations
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("validation error: {message}")]
    Validation { message: String },

    #[error("access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("message not found: {id}")]
    MessageNotFound { id: String },

    #[error("channel not found: {id}")]
    ChannelNotFound { id: String },

    #[error("user not found: {id}")]
    UserNotFound { id: String },

    #[error("not a participant of this channel")]
    ParticipantNotFound,
}

impl MessagingError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create an access denied error
    pub fn access_denied(reason: impl Into<String>) -> Self {
        Self::AccessDenied {
            reason: reason.into(),
        }
    }

    pub fn message_not_found(id: impl Into<String>) -> Self {
        Self::MessageNotFound { id: id.into() }
    }

    pub fn channel_not_found(id: impl Into<String>) -> Self {
        Self::ChannelNotFound { id: id.into() }
    }

    pub fn user_not_found(id: impl Into<String>) -> Self {
        Self::UserNotFound { id: id.into() }
    }
}
