//! Channel and participant entity definitions

use serde::{Deserialize, Serialize};

/// A named multi-party conversation with an explicit membership list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
    pub created_at: String,
}

/// Insert payload for a new channel.
#[derive(Debug, Clone)]
pub struct NewChannel {
    pub name: String,
    pub description: Option<String>,
    pub created_by: i64,
}

/// A (channel, user) membership row. Presence of this row is the
/// authorization boundary for reading and writing the channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelParticipant {
    pub id: i64,
    pub channel_id: i64,
    pub user_id: i64,
    pub joined_at: String,
}
