//! Event types for realtime message updates.

use outreach_database::Message;
use serde::{Deserialize, Serialize};

/// A change event on the message relation, pushed to subscribed views.
///
/// Every variant carries the affected message so subscribers can derive the
/// conversation it belongs to; for deletions the row still identifies the
/// conversation even though its `deleted_at` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MessageEvent {
    MessageCreated { message: Message },
    MessageUpdated { message: Message },
    MessageDeleted { message: Message },
}

impl MessageEvent {
    /// The message the event refers to.
    pub fn message(&self) -> &Message {
        match self {
            MessageEvent::MessageCreated { message }
            | MessageEvent::MessageUpdated { message }
            | MessageEvent::MessageDeleted { message } => message,
        }
    }
}
