use chrono::{DateTime, Utc};

use crate::transport::RawInboundMessage;

/// The single message shape exposed across the orchestrator boundary.
#[derive(Debug, Clone)]
pub struct NormalizedMessage {
    pub id: String,
    pub text: String,
    pub is_from_bot: bool,
    pub received_at: DateTime<Utc>,
}

impl NormalizedMessage {
    pub fn bot(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_from_bot: true,
            received_at: Utc::now(),
        }
    }

    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_from_bot: false,
            received_at: Utc::now(),
        }
    }

    /// Normalize a raw backend record using the classifier's verdict.
    pub fn from_raw(raw: &RawInboundMessage, is_from_bot: bool) -> Self {
        Self {
            id: raw.id.clone(),
            text: raw.body_text().to_string(),
            is_from_bot,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_raw_extracts_payload_text() {
        let raw: RawInboundMessage = serde_json::from_str(
            r#"{"id":"m1","payload":{"type":"text","text":"Hi"}}"#,
        )
        .unwrap();

        let normalized = NormalizedMessage::from_raw(&raw, true);
        assert_eq!(normalized.id, "m1");
        assert_eq!(normalized.text, "Hi");
        assert!(normalized.is_from_bot);
    }

    #[test]
    fn test_local_constructors() {
        let echo = NormalizedMessage::user("local-0", "hello");
        assert!(!echo.is_from_bot);

        let notice = NormalizedMessage::bot("welcome", "hi there");
        assert!(notice.is_from_bot);
    }
}
