//! Message entity definitions

use serde::{Deserialize, Serialize};

/// A persisted message row, joined with the public ids of its sender,
/// recipient, channel, and reply-to message.
///
/// Exactly one of `recipient_id` / `channel_id` is set: a message is either
/// part of a direct conversation or of a channel, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub public_id: String,
    pub sender_id: i64,
    pub sender_public_id: String,
    pub recipient_id: Option<i64>,
    pub recipient_public_id: Option<String>,
    pub channel_id: Option<i64>,
    pub channel_public_id: Option<String>,
    pub content: String,
    pub reply_to_id: Option<i64>,
    pub reply_to_public_id: Option<String>,
    pub created_at: String,
    pub edited_at: Option<String>,
    pub deleted_at: Option<String>,
}

/// Insert payload for a new message. Destination ids are already resolved
/// to internal keys by the service layer.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub sender_id: i64,
    pub recipient_id: Option<i64>,
    pub channel_id: Option<i64>,
    pub content: String,
    pub reply_to_id: Option<i64>,
}

/// Filter set for message search. All fields optional; the service layer
/// rejects a filter set where none is meaningful.
#[derive(Debug, Clone, Default)]
pub struct MessageFilters {
    /// Free-text substring match against content.
    pub text: Option<String>,
    pub channel_id: Option<i64>,
    pub sender_id: Option<i64>,
    /// Matches messages the user sent or received; used by export.
    pub involving_user_id: Option<i64>,
    /// Restricts results to rows this user may read: their own direct
    /// messages plus channels they participate in. Unset only for
    /// channel-scoped searches (membership checked upstream) and for the
    /// founder export.
    pub visible_to_user_id: Option<i64>,
    /// RFC3339 lower bound (inclusive) on created_at, rendered in UTC to
    /// match the stored `created_at` format.
    pub after: Option<String>,
    /// RFC3339 upper bound (inclusive) on created_at, rendered in UTC.
    pub before: Option<String>,
}
