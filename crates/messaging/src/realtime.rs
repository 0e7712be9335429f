//! Realtime fan-out of message events.
//!
//! Each conversation (a channel, or a direct pair of users) maps to a
//! broadcast lane. Services publish into the feed after a successful write;
//! subscribers receive events only for the conversation they subscribed to.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use outreach_database::Message;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::types::events::MessageEvent;

/// Buffered events per conversation lane before slow subscribers lag.
const LANE_CAPACITY: usize = 256;

/// Identifies the conversation an event belongs to.
///
/// Direct scopes are normalized so that `direct(a, b)` and `direct(b, a)`
/// name the same lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationScope {
    Channel(i64),
    Direct { low: i64, high: i64 },
}

impl ConversationScope {
    pub fn channel(channel_id: i64) -> Self {
        ConversationScope::Channel(channel_id)
    }

    pub fn direct(a: i64, b: i64) -> Self {
        ConversationScope::Direct {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// The scope a stored message belongs to, if it has a valid destination.
    pub fn of_message(message: &Message) -> Option<Self> {
        if let Some(channel_id) = message.channel_id {
            Some(ConversationScope::channel(channel_id))
        } else {
            message
                .recipient_id
                .map(|recipient_id| ConversationScope::direct(message.sender_id, recipient_id))
        }
    }
}

/// Shared hub of per-conversation broadcast lanes.
#[derive(Clone, Default)]
pub struct MessageFeed {
    lanes: Arc<RwLock<HashMap<ConversationScope, broadcast::Sender<MessageEvent>>>>,
}

impl MessageFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one conversation. The returned handle stops receiving
    /// when dropped or explicitly stopped.
    pub fn subscribe(&self, scope: ConversationScope) -> Subscription {
        let mut lanes = self.lanes.write().unwrap_or_else(|e| e.into_inner());
        let sender = lanes
            .entry(scope)
            .or_insert_with(|| broadcast::channel(LANE_CAPACITY).0);
        debug!(?scope, subscribers = sender.receiver_count() + 1, "feed subscribe");
        Subscription {
            scope,
            receiver: Some(sender.subscribe()),
        }
    }

    /// Publish an event to the lane of the conversation it belongs to.
    /// Events for conversations with no subscribers are dropped.
    pub fn publish(&self, event: MessageEvent) {
        let Some(scope) = ConversationScope::of_message(event.message()) else {
            warn!("message event without a destination, dropping");
            return;
        };

        let mut lanes = self.lanes.write().unwrap_or_else(|e| e.into_inner());
        let orphaned = match lanes.get(&scope) {
            Some(sender) if sender.receiver_count() > 0 => {
                // Err only means all receivers vanished since the count check.
                let _ = sender.send(event);
                false
            }
            Some(_) => true,
            None => false,
        };
        if orphaned {
            lanes.remove(&scope);
        }
    }

    /// Number of live conversation lanes, for diagnostics.
    pub fn lane_count(&self) -> usize {
        self.lanes.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// A live subscription to one conversation's events.
///
/// Dropping the subscription unsubscribes; after `stop` no further events
/// are delivered.
pub struct Subscription {
    scope: ConversationScope,
    receiver: Option<broadcast::Receiver<MessageEvent>>,
}

impl Subscription {
    pub fn scope(&self) -> ConversationScope {
        self.scope
    }

    /// Receive the next event for this conversation. Returns `None` once the
    /// subscription is stopped or the lane is gone. Lagged gaps are skipped
    /// rather than surfaced to the caller.
    pub async fn recv(&mut self) -> Option<MessageEvent> {
        let receiver = self.receiver.as_mut()?;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    // Lanes are scoped per conversation, but double-check so a
                    // mispublished event can never cross conversations.
                    if ConversationScope::of_message(event.message()) == Some(self.scope) {
                        return Some(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(scope = ?self.scope, skipped, "subscriber lagged, skipping events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving. Idempotent.
    pub fn stop(&mut self) {
        self.receiver.take();
    }

    pub fn is_stopped(&self) -> bool {
        self.receiver.is_none()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
