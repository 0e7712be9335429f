//! Entity definitions for the store layer.

pub mod channel;
pub mod message;

pub use channel::{Channel, ChannelParticipant, NewChannel};
pub use message::{Message, MessageFilters, NewMessage};
