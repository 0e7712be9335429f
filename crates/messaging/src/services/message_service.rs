//! Message domain service: send, search, export, edit, delete.
//!
//! The service resolves public ids to internal keys, enforces authorization
//! (channel membership, sender/staff rules, founder-only export), and
//! publishes realtime events after successful writes.

use outreach_auth::{Authenticator, User};
use outreach_database::{
    ChannelRepository, Message, MessageFilters, MessageRepository, NewMessage,
    ParticipantRepository,
};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::realtime::MessageFeed;
use crate::types::errors::MessagingError;
use crate::types::events::MessageEvent;
use crate::types::requests::{ExportFormat, ExportRequest, SearchRequest, SendMessageRequest};
use crate::types::{ExportOutput, MessagingResult};
use crate::utils::{csv, Validator};

pub struct MessageService {
    messages: MessageRepository,
    channels: ChannelRepository,
    participants: ParticipantRepository,
    authenticator: Authenticator,
    feed: MessageFeed,
}

impl MessageService {
    pub fn new(pool: SqlitePool, authenticator: Authenticator, feed: MessageFeed) -> Self {
        Self {
            messages: MessageRepository::new(pool.clone()),
            channels: ChannelRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool),
            authenticator,
            feed,
        }
    }

    /// Send a message to a channel or a direct recipient.
    ///
    /// Exactly one destination must be set. Channel destinations require
    /// membership; nothing is persisted when validation or authorization
    /// fails.
    pub async fn send(&self, actor: &User, request: &SendMessageRequest) -> MessagingResult<Message> {
        Validator::message_content(&request.content)?;
        Validator::destination(request)?;

        let channel_id = match &request.channel_id {
            Some(public_id) => {
                let channel = self.channels.resolve_public_id(public_id).await?;
                if !self.participants.exists(channel.id, actor.id).await? {
                    return Err(MessagingError::access_denied(
                        "only channel members can post to a channel",
                    ));
                }
                Some(channel.id)
            }
            None => None,
        };

        let recipient_id = match &request.recipient_id {
            Some(public_id) => {
                let recipient = self
                    .authenticator
                    .find_user_by_public_id(public_id)
                    .await?
                    .ok_or_else(|| MessagingError::user_not_found(public_id))?;
                Some(recipient.id)
            }
            None => None,
        };

        let reply_to_id = match &request.reply_to_id {
            Some(public_id) => Some(self.resolve_reply_target(public_id).await?),
            None => None,
        };

        let message = self
            .messages
            .insert(&NewMessage {
                sender_id: actor.id,
                recipient_id,
                channel_id,
                content: request.content.clone(),
                reply_to_id,
            })
            .await?;

        self.feed.publish(MessageEvent::MessageCreated {
            message: message.clone(),
        });

        Ok(message)
    }

    /// Search messages by filter combination. Channel-scoped searches
    /// require membership in that channel; unscoped searches only see
    /// messages the actor may read (their own direct conversations and
    /// channels they belong to).
    pub async fn search(&self, actor: &User, request: &SearchRequest) -> MessagingResult<Vec<Message>> {
        Validator::search_filters(request)?;

        let channel_id = match &request.channel_id {
            Some(public_id) => {
                let channel = self.channels.resolve_public_id(public_id).await?;
                if !self.participants.exists(channel.id, actor.id).await? {
                    return Err(MessagingError::access_denied(
                        "only channel members can search a channel",
                    ));
                }
                Some(channel.id)
            }
            None => None,
        };

        let sender_id = match &request.sender_id {
            Some(public_id) => {
                let sender = self
                    .authenticator
                    .find_user_by_public_id(public_id)
                    .await?
                    .ok_or_else(|| MessagingError::user_not_found(public_id))?;
                Some(sender.id)
            }
            None => None,
        };

        let filters = MessageFilters {
            text: request.q.as_ref().map(|q| q.trim().to_string()).filter(|q| !q.is_empty()),
            channel_id,
            sender_id,
            involving_user_id: None,
            // Without a channel scope the actor's own visibility is the
            // authorization boundary.
            visible_to_user_id: if channel_id.is_some() { None } else { Some(actor.id) },
            after: request.after.as_deref().map(Validator::timestamp).transpose()?,
            before: request.before.as_deref().map(Validator::timestamp).transpose()?,
        };

        let results = self.messages.search(&filters, None).await?;
        debug!(actor = %actor.public_id, results = results.len(), "message search");
        Ok(results)
    }

    /// Export messages as CSV or JSON. Restricted to the founder role.
    pub async fn export(&self, actor: &User, request: &ExportRequest) -> MessagingResult<ExportOutput> {
        if actor.role != outreach_auth::Role::Founder {
            return Err(MessagingError::access_denied(
                "only the founder can export messages",
            ));
        }

        let channel_id = match &request.channel_id {
            Some(public_id) => Some(self.channels.resolve_public_id(public_id).await?.id),
            None => None,
        };

        let involving_user_id = match &request.user_id {
            Some(public_id) => {
                let user = self
                    .authenticator
                    .find_user_by_public_id(public_id)
                    .await?
                    .ok_or_else(|| MessagingError::user_not_found(public_id))?;
                Some(user.id)
            }
            None => None,
        };

        let filters = MessageFilters {
            channel_id,
            involving_user_id,
            ..Default::default()
        };
        let rows = self.messages.search(&filters, None).await?;

        info!(
            actor = %actor.public_id,
            rows = rows.len(),
            format = ?request.format,
            "message export"
        );

        let body = match request.format {
            ExportFormat::Csv => csv::render_messages(&rows),
            ExportFormat::Json => serde_json::to_string(&rows)
                .map_err(|e| MessagingError::validation(format!("export serialization failed: {e}")))?,
        };

        Ok(ExportOutput {
            format: request.format,
            body,
        })
    }

    /// Replace a message's content. Only the sender may edit.
    pub async fn edit(&self, actor: &User, public_id: &str, content: &str) -> MessagingResult<Message> {
        Validator::message_content(content)?;

        let message = self.fetch_live(public_id).await?;
        if message.sender_id != actor.id {
            return Err(MessagingError::access_denied(
                "only the sender can edit a message",
            ));
        }

        let updated = self.messages.update_content(message.id, content).await?;
        self.feed.publish(MessageEvent::MessageUpdated {
            message: updated.clone(),
        });

        Ok(updated)
    }

    /// Soft delete a message. Allowed to the sender or to staff moderators.
    pub async fn delete(&self, actor: &User, public_id: &str) -> MessagingResult<()> {
        let message = self.fetch_live(public_id).await?;
        if message.sender_id != actor.id && !actor.role.is_staff() {
            return Err(MessagingError::access_denied(
                "only the sender or staff can delete a message",
            ));
        }

        self.messages.soft_delete(message.id, actor.id).await?;

        // Re-read so the event carries the deletion stamp.
        if let Some(deleted) = self.messages.find_by_id(message.id).await? {
            self.feed.publish(MessageEvent::MessageDeleted { message: deleted });
        }

        Ok(())
    }

    /// Fetch the direct conversation between the actor and a peer, oldest
    /// first.
    pub async fn direct_conversation(
        &self,
        actor: &User,
        peer_public_id: &str,
    ) -> MessagingResult<Vec<Message>> {
        let peer = self
            .authenticator
            .find_user_by_public_id(peer_public_id)
            .await?
            .ok_or_else(|| MessagingError::user_not_found(peer_public_id))?;

        Ok(self
            .messages
            .find_direct_conversation(actor.id, peer.id, None)
            .await?)
    }

    async fn fetch_live(&self, public_id: &str) -> MessagingResult<Message> {
        let message = self
            .messages
            .find_by_public_id(public_id)
            .await?
            .ok_or_else(|| MessagingError::message_not_found(public_id))?;

        if message.deleted_at.is_some() {
            return Err(MessagingError::message_not_found(public_id));
        }

        Ok(message)
    }

    async fn resolve_reply_target(&self, public_id: &str) -> MessagingResult<i64> {
        Ok(self.fetch_live(public_id).await?.id)
    }
}
