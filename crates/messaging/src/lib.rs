//! Outreach Messaging Crate
//!
//! Domain logic for the messaging subsystem: sending, searching, and
//! exporting messages, channel membership authorization, and realtime
//! fan-out to subscribed views.

pub mod realtime;
pub mod services;
pub mod types;
pub mod utils;

pub use realtime::{ConversationScope, MessageFeed, Subscription};
pub use services::{ChannelService, MessageService};
pub use types::{
    errors::MessagingError,
    events::MessageEvent,
    requests::{CreateChannelRequest, ExportFormat, ExportRequest, SearchRequest, SendMessageRequest},
    ExportOutput, MessagingResult,
};
