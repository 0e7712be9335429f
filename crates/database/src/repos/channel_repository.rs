//! Repository for channel data access operations.

use crate::entities::{Channel, NewChannel};
use crate::types::{StoreError, StoreResult};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for channel database operations
pub struct ChannelRepository {
    pool: SqlitePool,
}

impl ChannelRepository {
    /// Create a new channel repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new channel
    pub async fn create(&self, request: &NewChannel) -> StoreResult<Channel> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO channels (public_id, name, description, created_by, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.created_by)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let channel_id = result.last_insert_rowid();

        info!(
            channel_id = channel_id,
            public_id = %public_id,
            name = %request.name,
            created_by = request.created_by,
            "created new channel"
        );

        Ok(Channel {
            id: channel_id,
            public_id,
            name: request.name.clone(),
            description: request.description.clone(),
            created_by: request.created_by,
            created_at: now,
        })
    }

    /// Find a channel by its public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> StoreResult<Option<Channel>> {
        let row = sqlx::query(
            "SELECT id, public_id, name, description, created_by, created_at
             FROM channels WHERE public_id = ?",
        )
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_channel).transpose()
    }

    /// Resolve a public id to the internal key, failing when absent.
    pub async fn resolve_public_id(&self, public_id: &str) -> StoreResult<Channel> {
        self.find_by_public_id(public_id)
            .await?
            .ok_or_else(|| StoreError::channel_not_found(public_id))
    }

    /// List all channels a user belongs to, most recently joined first
    pub async fn find_by_user_id(&self, user_id: i64) -> StoreResult<Vec<Channel>> {
        let rows = sqlx::query(
            "SELECT c.id, c.public_id, c.name, c.description, c.created_by, c.created_at
             FROM channels c
             JOIN channel_participants p ON p.channel_id = c.id
             WHERE p.user_id = ? ORDER BY p.joined_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_channel).collect()
    }
}

fn map_channel(row: &SqliteRow) -> StoreResult<Channel> {
    Ok(Channel {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_by: row.try_get("created_by")?,
        created_at: row.try_get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::ParticipantRepository;
    use sqlx::sqlite::SqliteConnectOptions;
    use tempfile::TempDir;

    async fn create_test_pool() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test_channels.db");

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await.unwrap();

        crate::migrations::MIGRATOR.run(&pool).await.unwrap();
        (pool, temp_dir)
    }

    async fn seed_user(pool: &SqlitePool, email: &str) -> i64 {
        let now = chrono::Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (public_id, email, role, created_at, updated_at) VALUES (?, ?, 'volunteer', ?, ?)",
        )
        .bind(cuid2::cuid())
        .bind(email)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
        result.last_insert_rowid()
    }

    #[tokio::test]
    async fn test_create_and_find_channel() {
        let (pool, _temp_dir) = create_test_pool().await;
        let creator = seed_user(&pool, "founder@example.org").await;
        let repo = ChannelRepository::new(pool);

        let channel = repo
            .create(&NewChannel {
                name: "volunteers".to_string(),
                description: Some("Volunteer coordination".to_string()),
                created_by: creator,
            })
            .await
            .unwrap();

        let found = repo.find_by_public_id(&channel.public_id).await.unwrap();
        assert_eq!(found, Some(channel));
    }

    #[tokio::test]
    async fn test_resolve_unknown_public_id_fails() {
        let (pool, _temp_dir) = create_test_pool().await;
        let repo = ChannelRepository::new(pool);

        let result = repo.resolve_public_id("missing").await;
        assert!(matches!(result, Err(StoreError::ChannelNotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_by_user_id_lists_joined_channels_only() {
        let (pool, _temp_dir) = create_test_pool().await;
        let creator = seed_user(&pool, "founder@example.org").await;
        let member = seed_user(&pool, "member@example.org").await;
        let channels = ChannelRepository::new(pool.clone());
        let participants = ParticipantRepository::new(pool);

        let joined = channels
            .create(&NewChannel {
                name: "joined".to_string(),
                description: None,
                created_by: creator,
            })
            .await
            .unwrap();
        channels
            .create(&NewChannel {
                name: "not-joined".to_string(),
                description: None,
                created_by: creator,
            })
            .await
            .unwrap();

        participants.add(joined.id, member).await.unwrap();

        let listed = channels.find_by_user_id(member).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "joined");
    }
}
