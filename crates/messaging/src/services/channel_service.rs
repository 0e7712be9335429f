//! Channel domain service: creation, listing, and membership.

use outreach_auth::User;
use outreach_database::{
    Channel, ChannelParticipant, ChannelRepository, NewChannel, ParticipantRepository, StoreError,
};
use sqlx::SqlitePool;
use tracing::info;

use crate::types::errors::MessagingError;
use crate::types::requests::CreateChannelRequest;
use crate::types::MessagingResult;
use crate::utils::Validator;

pub struct ChannelService {
    channels: ChannelRepository,
    participants: ParticipantRepository,
}

impl ChannelService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            channels: ChannelRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool),
        }
    }

    /// Create a channel. Staff only; the creator joins automatically.
    pub async fn create(&self, actor: &User, request: &CreateChannelRequest) -> MessagingResult<Channel> {
        if !actor.role.is_staff() {
            return Err(MessagingError::access_denied(
                "only staff can create channels",
            ));
        }
        Validator::channel_name(&request.name)?;

        let channel = self
            .channels
            .create(&NewChannel {
                name: request.name.trim().to_string(),
                description: request.description.clone(),
                created_by: actor.id,
            })
            .await?;
        self.participants.add(channel.id, actor.id).await?;

        info!(channel = %channel.public_id, creator = %actor.public_id, "channel created");
        Ok(channel)
    }

    /// List the channels the actor belongs to.
    pub async fn list_for(&self, actor: &User) -> MessagingResult<Vec<Channel>> {
        Ok(self.channels.find_by_user_id(actor.id).await?)
    }

    /// Join a channel. Joining twice is a validation error.
    pub async fn join(&self, actor: &User, channel_public_id: &str) -> MessagingResult<ChannelParticipant> {
        let channel = self.channels.resolve_public_id(channel_public_id).await?;

        match self.participants.add(channel.id, actor.id).await {
            Ok(participant) => Ok(participant),
            Err(StoreError::ParticipantExists) => Err(MessagingError::validation(
                "already a member of this channel",
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Leave a channel. Leaving a channel you are not in is a not-found.
    pub async fn leave(&self, actor: &User, channel_public_id: &str) -> MessagingResult<()> {
        let channel = self.channels.resolve_public_id(channel_public_id).await?;

        match self.participants.remove(channel.id, actor.id).await {
            Ok(()) => Ok(()),
            Err(StoreError::ParticipantNotFound) => Err(MessagingError::ParticipantNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// List a channel's members. Restricted to members of that channel.
    pub async fn members(
        &self,
        actor: &User,
        channel_public_id: &str,
    ) -> MessagingResult<Vec<ChannelParticipant>> {
        let channel = self.require_membership(actor, channel_public_id).await?;
        Ok(self.participants.find_by_channel_id(channel.id).await?)
    }

    /// Resolve a channel the actor is a member of, e.g. to authorize a
    /// realtime subscription.
    pub async fn require_membership(
        &self,
        actor: &User,
        channel_public_id: &str,
    ) -> MessagingResult<Channel> {
        let channel = self.channels.resolve_public_id(channel_public_id).await?;
        if !self.participants.exists(channel.id, actor.id).await? {
            return Err(MessagingError::access_denied(
                "only channel members can access this channel",
            ));
        }
        Ok(channel)
    }
}
