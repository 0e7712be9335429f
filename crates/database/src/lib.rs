//! Outreach Database Crate
//!
//! Connection management, migrations, entity definitions, and repository
//! implementations for the messaging backend.

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use repos::{ChannelRepository, MessageRepository, ParticipantRepository};

pub use entities::{
    channel::{Channel, ChannelParticipant, NewChannel},
    message::{Message, MessageFilters, NewMessage},
};

pub use types::{
    errors::StoreError,
    StoreResult,
};

/// Hard cap on rows returned by search and export queries.
pub const MAX_RESULT_ROWS: i64 = 5000;

use outreach_config::DatabaseConfig;
use sqlx::SqlitePool;

/// Initialize the database: connect and apply migrations.
pub async fn initialize_database(config: &DatabaseConfig) -> StoreResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    run_migrations(&pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    Ok(pool)
}
