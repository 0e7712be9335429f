//! Repository for message data access operations.

use crate::entities::{Message, MessageFilters, NewMessage};
use crate::types::{StoreError, StoreResult};
use crate::MAX_RESULT_ROWS;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

const SELECT_MESSAGE: &str = "SELECT m.id, m.public_id, m.sender_id, su.public_id AS sender_public_id, \
            m.recipient_id, ru.public_id AS recipient_public_id, \
            m.channel_id, c.public_id AS channel_public_id, \
            m.content, m.reply_to_id, rm.public_id AS reply_to_public_id, \
            m.created_at, m.edited_at, m.deleted_at \
     FROM messages m \
     JOIN users su ON su.id = m.sender_id \
     LEFT JOIN users ru ON ru.id = m.recipient_id \
     LEFT JOIN channels c ON c.id = m.channel_id \
     LEFT JOIN messages rm ON rm.id = m.reply_to_id";

/// Bind values collected while building a dynamic WHERE clause.
enum Bind {
    Text(String),
    Int(i64),
}

/// Repository for message database operations
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new message. The exactly-one-destination invariant is
    /// validated upstream and enforced again by the table CHECK.
    pub async fn insert(&self, request: &NewMessage) -> StoreResult<Message> {
        let public_id = cuid2::cuid();
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (public_id, sender_id, recipient_id, channel_id, content, reply_to_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&public_id)
        .bind(request.sender_id)
        .bind(request.recipient_id)
        .bind(request.channel_id)
        .bind(&request.content)
        .bind(request.reply_to_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id = message_id,
            public_id = %public_id,
            sender_id = request.sender_id,
            channel_id = ?request.channel_id,
            recipient_id = ?request.recipient_id,
            "created new message"
        );

        self.find_by_id(message_id)
            .await?
            .ok_or_else(|| StoreError::message_not_found(public_id))
    }

    /// Find a message by its internal ID
    pub async fn find_by_id(&self, id: i64) -> StoreResult<Option<Message>> {
        let row = sqlx::query(&format!("{SELECT_MESSAGE} WHERE m.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_message).transpose()
    }

    /// Find a message by its public ID
    pub async fn find_by_public_id(&self, public_id: &str) -> StoreResult<Option<Message>> {
        let row = sqlx::query(&format!("{SELECT_MESSAGE} WHERE m.public_id = ?"))
            .bind(public_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_message).transpose()
    }

    /// Search messages by an arbitrary filter combination.
    ///
    /// Soft-deleted rows are excluded. Results are ordered by creation time
    /// ascending and capped at [`MAX_RESULT_ROWS`].
    pub async fn search(&self, filters: &MessageFilters, limit: Option<i64>) -> StoreResult<Vec<Message>> {
        let mut conditions = vec!["m.deleted_at IS NULL".to_string()];
        let mut binds = Vec::new();

        if let Some(text) = &filters.text {
            conditions.push("m.content LIKE ?".to_string());
            binds.push(Bind::Text(format!("%{}%", text)));
        }
        if let Some(channel_id) = filters.channel_id {
            conditions.push("m.channel_id = ?".to_string());
            binds.push(Bind::Int(channel_id));
        }
        if let Some(sender_id) = filters.sender_id {
            conditions.push("m.sender_id = ?".to_string());
            binds.push(Bind::Int(sender_id));
        }
        if let Some(user_id) = filters.involving_user_id {
            conditions.push("(m.sender_id = ? OR m.recipient_id = ?)".to_string());
            binds.push(Bind::Int(user_id));
            binds.push(Bind::Int(user_id));
        }
        if let Some(user_id) = filters.visible_to_user_id {
            conditions.push(
                "(m.sender_id = ? OR m.recipient_id = ? \
                  OR m.channel_id IN (SELECT channel_id FROM channel_participants WHERE user_id = ?))"
                    .to_string(),
            );
            binds.push(Bind::Int(user_id));
            binds.push(Bind::Int(user_id));
            binds.push(Bind::Int(user_id));
        }
        if let Some(after) = &filters.after {
            conditions.push("m.created_at >= ?".to_string());
            binds.push(Bind::Text(after.clone()));
        }
        if let Some(before) = &filters.before {
            conditions.push("m.created_at <= ?".to_string());
            binds.push(Bind::Text(before.clone()));
        }

        let limit = limit.unwrap_or(MAX_RESULT_ROWS).clamp(1, MAX_RESULT_ROWS);
        let query = format!(
            "{SELECT_MESSAGE} WHERE {} ORDER BY m.created_at ASC, m.id ASC LIMIT ?",
            conditions.join(" AND ")
        );

        let mut query_builder = sqlx::query(&query);
        for bind in binds {
            query_builder = match bind {
                Bind::Text(value) => query_builder.bind(value),
                Bind::Int(value) => query_builder.bind(value),
            };
        }
        query_builder = query_builder.bind(limit);

        let rows = query_builder.fetch_all(&self.pool).await?;
        rows.iter().map(map_message).collect()
    }

    /// Fetch a direct conversation: all messages between the unordered
    /// (a, b) user pair, oldest first.
    pub async fn find_direct_conversation(
        &self,
        user_a: i64,
        user_b: i64,
        limit: Option<i64>,
    ) -> StoreResult<Vec<Message>> {
        let limit = limit.unwrap_or(MAX_RESULT_ROWS).clamp(1, MAX_RESULT_ROWS);

        let rows = sqlx::query(&format!(
            "{SELECT_MESSAGE} \
             WHERE m.deleted_at IS NULL \
               AND ((m.sender_id = ? AND m.recipient_id = ?) OR (m.sender_id = ? AND m.recipient_id = ?)) \
             ORDER BY m.created_at ASC, m.id ASC LIMIT ?"
        ))
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_message).collect()
    }

    /// Replace a message's content, stamping `edited_at`. Authorization
    /// (sender-only) is the service layer's concern.
    pub async fn update_content(&self, id: i64, content: &str) -> StoreResult<Message> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE messages SET content = ?, edited_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(content)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::message_not_found(id.to_string()));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::message_not_found(id.to_string()))
    }

    /// Soft delete a message by setting `deleted_at`.
    pub async fn soft_delete(&self, id: i64, deleted_by: i64) -> StoreResult<()> {
        let now = chrono::Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE messages SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::message_not_found(id.to_string()));
        }

        info!(message_id = id, deleted_by = deleted_by, "soft deleted message");
        Ok(())
    }
}

fn map_message(row: &SqliteRow) -> StoreResult<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        sender_id: row.try_get("sender_id")?,
        sender_public_id: row.try_get("sender_public_id")?,
        recipient_id: row.try_get("recipient_id")?,
        recipient_public_id: row.try_get("recipient_public_id")?,
        channel_id: row.try_get("channel_id")?,
        channel_public_id: row.try_get("channel_public_id")?,
        content: row.try_get("content")?,
        reply_to_id: row.try_get("reply_to_id")?,
        reply_to_public_id: row.try_get("reply_to_public_id")?,
        created_at: row.try_get("created_at")?,
        edited_at: row.try_get("edited_at")?,
        deleted_at: row.try_get("deleted_at")?,
    })
}
