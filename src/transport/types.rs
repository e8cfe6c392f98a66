use serde::Deserialize;

/// A message record exactly as the backend stores it. Arrives via push
/// or pull and is never mutated after receipt.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInboundMessage {
    pub id: String,
    #[serde(default)]
    pub payload: Option<MessagePayload>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
}

/// Typed payload carried by a message record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from_user: Option<bool>,
    #[serde(default)]
    pub author_id: Option<String>,
}

impl RawInboundMessage {
    /// Human-readable body: payload text first, then the bare text field.
    pub fn body_text(&self) -> &str {
        self.payload
            .as_ref()
            .and_then(|p| p.text.as_deref())
            .or(self.text.as_deref())
            .unwrap_or_default()
    }
}
