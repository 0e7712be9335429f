//! Repository implementations for the store layer.

pub mod channel_repository;
pub mod message_repository;
pub mod participant_repository;

pub use channel_repository::ChannelRepository;
pub use message_repository::MessageRepository;
pub use participant_repository::ParticipantRepository;
