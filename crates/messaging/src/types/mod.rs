//! Shared types for the messaging crate.

pub mod errors;
pub mod events;
pub mod requests;

pub use errors::MessagingError;
pub use events::MessageEvent;
pub use requests::{CreateChannelRequest, ExportFormat, ExportRequest, SearchRequest, SendMessageRequest};

/// Result type alias for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;

/// A rendered export document, either a CSV body or a JSON array.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutput {
    pub format: ExportFormat,
    pub body: String,
}

impl ExportOutput {
    pub fn content_type(&self) -> &'static str {
        match self.format {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self.format {
            ExportFormat::Csv => "messages.csv",
            ExportFormat::Json => "messages.json",
        }
    }
}
