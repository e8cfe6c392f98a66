use std::sync::Arc;

/// Bearer credential identifying one backend user.
#[derive(Debug, Clone)]
pub struct Credential {
    pub user_id: String,
    /// Sent as the bearer token on authenticated calls
    pub key: String,
}

/// An established session: one user, one conversation.
///
/// Immutable once produced; a reconnect that needs fresh identity goes
/// through `SessionManager::reset` and yields a new value rather than
/// mutating this one.
#[derive(Debug, Clone)]
pub struct Session {
    pub credential: Credential,
    pub conversation_id: String,
}

/// Session lifecycle phases
#[derive(Debug, Clone)]
pub(crate) enum SessionPhase {
    Uninitialized,
    Initializing,
    Ready(Arc<Session>),
}
