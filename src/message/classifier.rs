use tracing::trace;

use crate::constants::{
    BOT_AUTHOR_MARKERS, DIRECTION_INCOMING, DIRECTION_OUTGOING, PAYLOAD_TYPE_TEXT,
};
use crate::transport::RawInboundMessage;

/// The origin a single rule can assign: Some(true) = bot,
/// Some(false) = user, None = no opinion.
type Verdict = Option<bool>;

/// One classification rule: a name for tracing plus the decision fn.
type Rule = (&'static str, fn(&RawInboundMessage) -> Verdict);

/// Ordered rule table; the first rule with an opinion wins. Later rules
/// are weaker heuristics and must not override explicit signals.
const RULES: &[Rule] = &[
    ("direction", direction_rule),
    ("author-marker", author_marker_rule),
    ("payload-from-user", payload_from_user_rule),
    ("payload-author-marker", payload_author_marker_rule),
    ("payload-text-default", payload_text_default_rule),
];

/// Decide whether a record originated from the bot.
///
/// Total and side-effect free: malformed or signal-free records default
/// to bot rather than being dropped, so the caller always decides
/// visibility.
pub fn classify(raw: &RawInboundMessage) -> bool {
    for (name, rule) in RULES {
        if let Some(is_from_bot) = rule(raw) {
            trace!(rule = %name, is_from_bot, id = %raw.id, "classified message");
            return is_from_bot;
        }
    }
    // Fail-open default
    true
}

fn is_bot_marker(author: &str) -> bool {
    BOT_AUTHOR_MARKERS
        .iter()
        .any(|marker| author.eq_ignore_ascii_case(marker))
}

// An explicit direction flag is the backend's own word for who sent the
// record: "outgoing" leaves the bot, "incoming" came from the user.
fn direction_rule(raw: &RawInboundMessage) -> Verdict {
    match raw.direction.as_deref() {
        Some(DIRECTION_OUTGOING) => Some(true),
        Some(DIRECTION_INCOMING) => Some(false),
        _ => None,
    }
}

fn author_marker_rule(raw: &RawInboundMessage) -> Verdict {
    match raw.author_id.as_deref() {
        Some(author) if is_bot_marker(author) => Some(true),
        _ => None,
    }
}

fn payload_from_user_rule(raw: &RawInboundMessage) -> Verdict {
    raw.payload
        .as_ref()
        .and_then(|p| p.from_user)
        .map(|from_user| !from_user)
}

fn payload_author_marker_rule(raw: &RawInboundMessage) -> Verdict {
    match raw.payload.as_ref().and_then(|p| p.author_id.as_deref()) {
        Some(author) if is_bot_marker(author) => Some(true),
        _ => None,
    }
}

// Default-trust heuristic: a bare text payload with no origin field is
// assumed to be the bot's. Known to be unreliable; kept pending a
// backend-side origin field.
fn payload_text_default_rule(raw: &RawInboundMessage) -> Verdict {
    let payload = raw.payload.as_ref()?;
    if payload.kind.as_deref() == Some(PAYLOAD_TYPE_TEXT) && payload.from_user.is_none() {
        Some(true)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MessagePayload;

    fn record(id: &str) -> RawInboundMessage {
        RawInboundMessage {
            id: id.to_string(),
            payload: None,
            text: None,
            author_id: None,
            direction: None,
        }
    }

    fn text_payload(text: &str) -> MessagePayload {
        MessagePayload {
            kind: Some("text".to_string()),
            text: Some(text.to_string()),
            from_user: None,
            author_id: None,
        }
    }

    #[test]
    fn test_outgoing_direction_is_bot() {
        let mut raw = record("m1");
        raw.direction = Some("outgoing".to_string());
        assert!(classify(&raw));
    }

    #[test]
    fn test_incoming_direction_is_user() {
        let mut raw = record("m1");
        raw.direction = Some("incoming".to_string());
        raw.payload = Some(text_payload("typed by the user"));
        assert!(!classify(&raw));
    }

    #[test]
    fn test_direction_overrides_payload_signals() {
        let mut raw = record("m1");
        raw.direction = Some("outgoing".to_string());
        let mut payload = text_payload("Hi");
        payload.from_user = Some(true);
        raw.payload = Some(payload);
        assert!(classify(&raw));
    }

    #[test]
    fn test_bot_author_is_bot() {
        let mut raw = record("m1");
        raw.author_id = Some("bot".to_string());
        assert!(classify(&raw));
    }

    #[test]
    fn test_bot_author_overrides_from_user() {
        let mut raw = record("m1");
        raw.author_id = Some("assistant".to_string());
        let mut payload = text_payload("Hi");
        payload.from_user = Some(true);
        raw.payload = Some(payload);
        assert!(classify(&raw));
    }

    #[test]
    fn test_unrecognized_author_has_no_opinion() {
        let mut raw = record("m1");
        raw.author_id = Some("u-42".to_string());
        let mut payload = text_payload("Hi");
        payload.from_user = Some(true);
        raw.payload = Some(payload);
        assert!(!classify(&raw));
    }

    #[test]
    fn test_payload_from_user_false_is_bot() {
        let mut raw = record("m1");
        let mut payload = text_payload("Hi");
        payload.from_user = Some(false);
        raw.payload = Some(payload);
        assert!(classify(&raw));
    }

    #[test]
    fn test_payload_from_user_true_is_user() {
        let mut raw = record("m1");
        let mut payload = text_payload("Hi");
        payload.from_user = Some(true);
        raw.payload = Some(payload);
        assert!(!classify(&raw));
    }

    #[test]
    fn test_payload_author_marker_is_bot() {
        let mut raw = record("m1");
        raw.payload = Some(MessagePayload {
            kind: Some("card".to_string()),
            text: Some("pick one".to_string()),
            from_user: None,
            author_id: Some("system".to_string()),
        });
        assert!(classify(&raw));
    }

    #[test]
    fn test_bare_text_payload_defaults_to_bot() {
        let mut raw = record("m1");
        raw.payload = Some(text_payload("Hi"));
        assert!(classify(&raw));
    }

    #[test]
    fn test_signal_free_record_fails_open_to_bot() {
        assert!(classify(&record("m1")));
    }
}
