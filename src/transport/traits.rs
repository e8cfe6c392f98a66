use async_trait::async_trait;
use futures::stream::BoxStream;
#[cfg(test)]
use mockall::automock;

use super::types::RawInboundMessage;
use crate::session::{Credential, Session};
use crate::utils::Result;

/// One raw server-sent event from the push channel. The payload is left
/// undecoded so the delivery layer can degrade unparseable data to
/// literal text instead of dropping it.
#[derive(Debug, Clone)]
pub struct PushEvent {
    pub data: String,
}

/// Stream of push events for one conversation.
pub type PushStream = BoxStream<'static, Result<PushEvent>>;

/// Backend operations the rest of the crate depends on.
///
/// None of these retry internally and none assume backend idempotency;
/// duplicate delivery is handled downstream by the delivery channel.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Create a user identity; the returned credential authenticates all
    /// subsequent calls.
    async fn create_user(&self) -> Result<Credential>;

    /// Create a conversation owned by the credential's user.
    async fn create_conversation(&self, credential: &Credential) -> Result<String>;

    /// Enqueue a text message. The bot reply arrives asynchronously
    /// through the delivery channel, not through this call's result.
    async fn send_message(&self, session: &Session, text: &str) -> Result<String>;

    /// All messages stored for the conversation, oldest first. The
    /// backend's stored order is append-only and stable across calls.
    async fn list_messages(&self, session: &Session) -> Result<Vec<RawInboundMessage>>;

    /// Open the per-conversation server-sent-event stream. A non-2xx on
    /// open is an immediate error.
    async fn open_push_stream(&self, session: &Session) -> Result<PushStream>;

    /// Liveness probe; informational only, never propagates an error.
    async fn health_check(&self) -> bool;
}
