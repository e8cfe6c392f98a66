use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::state::{Session, SessionPhase};
use crate::transport::Transport;
use crate::utils::{ChatError, Result};

/// Owns the session lifecycle: bootstrap, reuse, reset.
pub struct SessionManager {
    transport: Arc<dyn Transport>,
    // Held across the bootstrap await so an overlapping initialize()
    // waits for the in-flight attempt instead of creating a second
    // user and conversation.
    phase: Mutex<SessionPhase>,
}

impl SessionManager {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            phase: Mutex::new(SessionPhase::Uninitialized),
        }
    }

    /// Bootstrap the session if one is not already ready.
    ///
    /// Returns true once a session exists. False means the backend could
    /// not be reached yet; that is an expected steady state, not a
    /// fault, so it is surfaced as a status rather than an error.
    pub async fn initialize(&self) -> bool {
        let mut phase = self.phase.lock().await;
        if let SessionPhase::Ready(_) = &*phase {
            return true;
        }
        *phase = SessionPhase::Initializing;

        match self.bootstrap().await {
            Ok(session) => {
                debug!("Session ready: conversation {}", session.conversation_id);
                *phase = SessionPhase::Ready(Arc::new(session));
                true
            }
            Err(e) => {
                warn!("Session bootstrap failed: {}", e);
                *phase = SessionPhase::Uninitialized;
                false
            }
        }
    }

    async fn bootstrap(&self) -> Result<Session> {
        let credential = self.transport.create_user().await?;
        let conversation_id = self.transport.create_conversation(&credential).await?;
        Ok(Session {
            credential,
            conversation_id,
        })
    }

    /// Drop the stored session ahead of a reconnect that needs a fresh
    /// identity.
    pub async fn reset(&self) {
        let mut phase = self.phase.lock().await;
        *phase = SessionPhase::Uninitialized;
    }

    /// The current session, if one is ready.
    pub async fn session(&self) -> Option<Arc<Session>> {
        match &*self.phase.lock().await {
            SessionPhase::Ready(session) => Some(Arc::clone(session)),
            _ => None,
        }
    }

    /// Session accessor for operations that require initialization.
    pub async fn require_session(&self) -> Result<Arc<Session>> {
        self.session().await.ok_or(ChatError::NotInitialized)
    }

    pub async fn is_ready(&self) -> bool {
        self.session().await.is_some()
    }
}
