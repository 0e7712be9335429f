//! Repository for channel participant data access operations.

use crate::entities::ChannelParticipant;
use crate::types::{StoreError, StoreResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for channel membership rows.
pub struct ParticipantRepository {
    pool: SqlitePool,
}

impl ParticipantRepository {
    /// Create a new participant repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Membership check: a single existence lookup against the participant
    /// relation. Deliberately uncached; every call re-queries the store.
    pub async fn exists(&self, channel_id: i64, user_id: i64) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM channel_participants WHERE channel_id = ? AND user_id = ?) AS present",
        )
        .bind(channel_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get::<i64, _>("present")? != 0)
    }

    /// Add a user to a channel
    pub async fn add(&self, channel_id: i64, user_id: i64) -> StoreResult<ChannelParticipant> {
        if self.exists(channel_id, user_id).await? {
            return Err(StoreError::ParticipantExists);
        }

        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO channel_participants (channel_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(channel_id)
        .bind(user_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        info!(channel_id = channel_id, user_id = user_id, "user joined channel");

        Ok(ChannelParticipant {
            id: result.last_insert_rowid(),
            channel_id,
            user_id,
            joined_at: now,
        })
    }

    /// Remove a user from a channel
    pub async fn remove(&self, channel_id: i64, user_id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "DELETE FROM channel_participants WHERE channel_id = ? AND user_id = ?",
        )
        .bind(channel_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ParticipantNotFound);
        }

        info!(channel_id = channel_id, user_id = user_id, "user left channel");
        Ok(())
    }

    /// List all participants of a channel, oldest membership first
    pub async fn find_by_channel_id(&self, channel_id: i64) -> StoreResult<Vec<ChannelParticipant>> {
        let rows = sqlx::query(
            "SELECT id, channel_id, user_id, joined_at
             FROM channel_participants WHERE channel_id = ? ORDER BY joined_at ASC",
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_participant).collect()
    }
}

fn map_participant(row: &SqliteRow) -> StoreResult<ChannelParticipant> {
    Ok(ChannelParticipant {
        id: row.try_get("id")?,
        channel_id: row.try_get("channel_id")?,
        user_id: row.try_get("user_id")?,
        joined_at: row.try_get("joined_at")?,
    })
}
