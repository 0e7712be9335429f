//! Shared application state for the gateway.

use std::sync::Arc;

use outreach_auth::Authenticator;
use outreach_config::{AppConfig, AuthConfig};
use outreach_database::initialize_database;
use outreach_messaging::{ChannelService, MessageFeed, MessageService};
use sqlx::SqlitePool;

use crate::error::{GatewayError, GatewayResult};

/// Shared application state containing all services.
#[derive(Clone)]
pub struct GatewayState {
    pub pool: SqlitePool,
    pub authenticator: Authenticator,
    pub feed: MessageFeed,
    pub message_service: Arc<MessageService>,
    pub channel_service: Arc<ChannelService>,
}

impl GatewayState {
    /// Wire up all services over an existing pool.
    pub fn new(pool: SqlitePool, auth_config: AuthConfig) -> Self {
        let authenticator = Authenticator::new(pool.clone(), auth_config);
        let feed = MessageFeed::new();
        let message_service = Arc::new(MessageService::new(
            pool.clone(),
            authenticator.clone(),
            feed.clone(),
        ));
        let channel_service = Arc::new(ChannelService::new(pool.clone()));

        Self {
            pool,
            authenticator,
            feed,
            message_service,
            channel_service,
        }
    }

    /// Initialize the database from configuration and wire up the state.
    pub async fn from_config(config: &AppConfig) -> GatewayResult<Self> {
        let pool = initialize_database(&config.database)
            .await
            .map_err(|e| GatewayError::Database(format!("database initialization failed: {e}")))?;

        Ok(Self::new(pool, config.auth.clone()))
    }
}
