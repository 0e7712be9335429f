//! Validation utilities.

use crate::types::errors::MessagingError;
use crate::types::requests::{SearchRequest, SendMessageRequest};

/// Validation utilities
pub struct Validator;

impl Validator {
    /// Validate message content
    pub fn message_content(content: &str) -> Result<(), MessagingError> {
        if content.trim().is_empty() {
            return Err(MessagingError::validation("message content cannot be empty"));
        }

        if content.len() > 100_000 {
            return Err(MessagingError::validation(
                "message content too long (max 100,000 characters)",
            ));
        }

        Ok(())
    }

    /// Validate that exactly one destination is present on a send request.
    pub fn destination(request: &SendMessageRequest) -> Result<(), MessagingError> {
        match (&request.channel_id, &request.recipient_id) {
            (Some(_), Some(_)) => Err(MessagingError::validation(
                "a message targets either a channel or a recipient, not both",
            )),
            (None, None) => Err(MessagingError::validation(
                "a message requires a channel or a recipient",
            )),
            _ => Ok(()),
        }
    }

    /// Validate channel name
    pub fn channel_name(name: &str) -> Result<(), MessagingError> {
        if name.trim().is_empty() {
            return Err(MessagingError::validation("channel name cannot be empty"));
        }

        if name.len() > 255 {
            return Err(MessagingError::validation(
                "channel name too long (max 255 characters)",
            ));
        }

        Ok(())
    }

    /// Parse an RFC3339 timestamp filter and canonicalize it to UTC.
    ///
    /// Stored `created_at` values are UTC with a `+00:00` suffix and are
    /// compared as strings, so bounds carrying another offset (or a `Z`
    /// suffix) must be re-rendered in the same form before binding.
    pub fn timestamp(value: &str) -> Result<String, MessagingError> {
        let parsed = chrono::DateTime::parse_from_rfc3339(value)
            .map_err(|e| MessagingError::validation(format!("invalid timestamp: {e}")))?;
        Ok(parsed.with_timezone(&chrono::Utc).to_rfc3339())
    }

    /// Reject a search request where no filter is meaningful.
    pub fn search_filters(request: &SearchRequest) -> Result<(), MessagingError> {
        let has_text = request
            .q
            .as_deref()
            .map(|q| !q.trim().is_empty())
            .unwrap_or(false);

        if !has_text
            && request.channel_id.is_none()
            && request.sender_id.is_none()
            && request.after.is_none()
            && request.before.is_none()
        {
            return Err(MessagingError::validation(
                "at least one search filter is required",
            ));
        }

        if let Some(after) = &request.after {
            Self::timestamp(after)?;
        }
        if let Some(before) = &request.before {
            Self::timestamp(before)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_content() {
        assert!(Validator::message_content("Valid message").is_ok());
        assert!(Validator::message_content("").is_err());
        assert!(Validator::message_content("   ").is_err());

        let too_long = "a".repeat(100_001);
        assert!(Validator::message_content(&too_long).is_err());
    }

    #[test]
    fn test_destination_requires_exactly_one() {
        let mut request = SendMessageRequest {
            content: "hello".to_string(),
            ..Default::default()
        };
        assert!(Validator::destination(&request).is_err());

        request.channel_id = Some("c1".to_string());
        assert!(Validator::destination(&request).is_ok());

        request.recipient_id = Some("u1".to_string());
        assert!(Validator::destination(&request).is_err());

        request.channel_id = None;
        assert!(Validator::destination(&request).is_ok());
    }

    #[test]
    fn test_channel_name() {
        assert!(Validator::channel_name("general").is_ok());
        assert!(Validator::channel_name(" ").is_err());
        assert!(Validator::channel_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_timestamp_canonicalizes_to_utc() {
        // Non-UTC offsets and the `Z` suffix both render as `+00:00`,
        // matching the stored created_at format.
        assert_eq!(
            Validator::timestamp("2024-05-01T12:00:00+05:00").unwrap(),
            "2024-05-01T07:00:00+00:00"
        );
        assert_eq!(
            Validator::timestamp("2024-05-01T12:00:00Z").unwrap(),
            "2024-05-01T12:00:00+00:00"
        );
        assert!(Validator::timestamp("yesterday").is_err());
    }

    #[test]
    fn test_search_filters_rejects_empty_set() {
        assert!(Validator::search_filters(&SearchRequest::default()).is_err());

        let blank_text = SearchRequest {
            q: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(Validator::search_filters(&blank_text).is_err());

        let by_channel = SearchRequest {
            channel_id: Some("c1".to_string()),
            ..Default::default()
        };
        assert!(Validator::search_filters(&by_channel).is_ok());

        let bad_bound = SearchRequest {
            after: Some("not-a-date".to_string()),
            ..Default::default()
        };
        assert!(Validator::search_filters(&bad_bound).is_err());
    }
}
