//! Error types for the store layer.

use thiserror::Error;

/// Main error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("failed to connect to database: {0}")]
    Connection(String),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("message not found: {id}")]
    MessageNotFound { id: String },

    #[error("channel not found: {id}")]
    ChannelNotFound { id: String },

    #[error("user not found: {id}")]
    UserNotFound { id: String },

    #[error("user is already a participant of this channel")]
    ParticipantExists,

    #[error("user is not a participant of this channel")]
    ParticipantNotFound,
}

impl StoreError {
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
