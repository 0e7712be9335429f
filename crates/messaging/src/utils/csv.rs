//! CSV rendering for message exports.
//!
//! Fixed column order: id, sender_id, recipient_id, channel_id, content,
//! created_at. Fields containing a comma, quote, or newline are wrapped in
//! double quotes with embedded quotes doubled, so re-parsing yields the
//! original content unchanged.

use outreach_database::Message;

const HEADER: &str = "id,sender_id,recipient_id,channel_id,content,created_at";

/// Render a batch of messages as a CSV document.
pub fn render_messages(messages: &[Message]) -> String {
    let mut out = String::with_capacity(64 + messages.len() * 96);
    out.push_str(HEADER);
    out.push('\n');

    for message in messages {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            escape(&message.public_id),
            escape(&message.sender_public_id),
            escape(message.recipient_public_id.as_deref().unwrap_or("")),
            escape(message.channel_public_id.as_deref().unwrap_or("")),
            escape(&message.content),
            escape(&message.created_at),
        ));
    }

    out
}

fn escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_message(content: &str) -> Message {
        Message {
            id: 1,
            public_id: "m1".to_string(),
            sender_id: 10,
            sender_public_id: "u10".to_string(),
            recipient_id: None,
            recipient_public_id: None,
            channel_id: Some(20),
            channel_public_id: Some("c20".to_string()),
            content: content.to_string(),
            reply_to_id: None,
            reply_to_public_id: None,
            created_at: "2024-05-01T12:00:00Z".to_string(),
            edited_at: None,
            deleted_at: None,
        }
    }

    #[test]
    fn test_plain_fields_are_not_quoted() {
        let csv = render_messages(&[sample_message("hello")]);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,sender_id,recipient_id,channel_id,content,created_at"
        );
        assert_eq!(lines.next().unwrap(), "m1,u10,,c20,hello,2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let csv = render_messages(&[sample_message(r#"she said "hi""#)]);
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(r#""she said ""hi""""#));
    }

    #[test]
    fn test_quote_escaping_round_trips() {
        let original = r#"a "quoted" value, with comma"#;
        let csv = render_messages(&[sample_message(original)]);
        let row = csv.lines().nth(1).unwrap();

        // Minimal RFC4180-style parse of the quoted content field; the
        // timestamp column after it contains no quotes.
        let start = row.find('"').unwrap();
        let end = row.rfind('"').unwrap();
        let reparsed = row[start + 1..end].replace("\"\"", "\"");
        assert_eq!(reparsed, original);
    }

    #[test]
    fn test_newlines_force_quoting() {
        let csv = render_messages(&[sample_message("line one\nline two")]);
        assert!(csv.contains("\"line one\nline two\""));
    }
}
