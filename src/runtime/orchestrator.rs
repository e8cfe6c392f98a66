use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::constants::{SEND_FAILURE_TEXT, WELCOME_MESSAGE_ID, WELCOME_MESSAGE_TEXT};
use crate::delivery::{DeliveryChannel, DeliveryHandle, ErrorCallback, MessageCallback};
use crate::message::NormalizedMessage;
use crate::session::SessionManager;
use crate::transport::Transport;
use crate::utils::ChatError;

/// Connection lifecycle as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Events emitted to the caller (the widget layer).
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// A transcript entry: a bot message, the local echo of a user
    /// message, or a locally synthesized error notice.
    Message(NormalizedMessage),
    /// Connection state transition.
    Connection(ConnectionState),
    /// Whether a send is still awaiting its bot reply. UI affordance
    /// only, not a session state.
    Sending(bool),
    /// A reportable failure, for status display.
    Error(String),
}

/// Callback receiving every orchestrator event.
pub type EventCallback = Arc<dyn Fn(ChatEvent) + Send + Sync>;

/// Top-level chat core: bootstraps the session, sends user messages and
/// surfaces bot replies as `ChatEvent`s.
pub struct Orchestrator {
    transport: Arc<dyn Transport>,
    sessions: SessionManager,
    on_event: EventCallback,
    state: Mutex<ConnectionState>,
    channel: Mutex<Option<DeliveryHandle>>,
    sending: Arc<AtomicBool>,
    local_seq: AtomicU64,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn Transport>, on_event: EventCallback) -> Self {
        Self {
            sessions: SessionManager::new(Arc::clone(&transport)),
            transport,
            on_event,
            state: Mutex::new(ConnectionState::Disconnected),
            channel: Mutex::new(None),
            sending: Arc::new(AtomicBool::new(false)),
            local_seq: AtomicU64::new(0),
        }
    }

    /// Bootstrap the session and begin delivery. On failure the
    /// orchestrator stays `Disconnected` and reports the error; the
    /// caller keeps its retry affordance.
    pub async fn start(&self) -> bool {
        self.set_state(ConnectionState::Connecting);

        if !self.transport.health_check().await {
            debug!("Health probe failed; attempting bootstrap anyway");
        }

        if !self.sessions.initialize().await {
            self.set_state(ConnectionState::Disconnected);
            self.emit(ChatEvent::Error(
                "Could not connect to the bot backend".to_string(),
            ));
            return false;
        }

        self.open_channel().await;
        self.set_state(ConnectionState::Connected);

        // Pre-existing welcome content is the first transcript entry
        self.emit(ChatEvent::Message(NormalizedMessage::bot(
            WELCOME_MESSAGE_ID,
            WELCOME_MESSAGE_TEXT,
        )));
        true
    }

    /// Send a user message. Empty input and disconnected states are
    /// silent no-ops; a transport failure surfaces as a transcript
    /// notice, never as a raised fault.
    pub async fn send(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() || self.state() != ConnectionState::Connected {
            return;
        }

        // Optimistic local echo, ahead of any network round trip
        self.emit(ChatEvent::Message(NormalizedMessage::user(
            self.local_id("local"),
            text,
        )));
        if !self.sending.swap(true, Ordering::SeqCst) {
            self.emit(ChatEvent::Sending(true));
        }

        let session = match self.sessions.require_session().await {
            Ok(session) => session,
            Err(e) => {
                self.fail_send(e);
                return;
            }
        };

        match self.transport.send_message(&session, text).await {
            Ok(message_id) => debug!("Message {} accepted by backend", message_id),
            Err(e) => self.fail_send(e),
        }
    }

    /// Tear down the delivery channel and run the bootstrap again,
    /// reusing the existing session when it is still valid.
    pub async fn reconnect(&self) -> bool {
        self.close_channel();
        self.set_state(ConnectionState::Connecting);

        if !self.sessions.initialize().await {
            self.set_state(ConnectionState::Disconnected);
            self.emit(ChatEvent::Error("Reconnect failed".to_string()));
            return false;
        }

        self.open_channel().await;
        self.set_state(ConnectionState::Connected);
        true
    }

    /// Drop the stored session so the next reconnect starts from a
    /// fresh identity.
    pub async fn reset_session(&self) {
        self.sessions.reset().await;
    }

    /// Close the delivery channel and release resources. Idempotent.
    pub fn stop(&self) {
        self.close_channel();
        self.set_state(ConnectionState::Disconnected);
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    async fn open_channel(&self) {
        let session = match self.sessions.session().await {
            Some(session) => session,
            None => return,
        };

        let events = Arc::clone(&self.on_event);
        let sending = Arc::clone(&self.sending);
        let on_message: MessageCallback = Arc::new(move |message| {
            // A bot reply ends the sending affordance
            if sending.swap(false, Ordering::SeqCst) {
                events(ChatEvent::Sending(false));
            }
            events(ChatEvent::Message(message));
        });

        let events = Arc::clone(&self.on_event);
        let on_error: ErrorCallback = Arc::new(move |error| {
            events(ChatEvent::Error(error.to_string()));
        });

        let handle = DeliveryChannel::open(
            Arc::clone(&self.transport),
            session,
            on_message,
            on_error,
        );
        if let Some(previous) = self.channel.lock().replace(handle) {
            previous.close();
        }
    }

    fn close_channel(&self) {
        if let Some(handle) = self.channel.lock().take() {
            handle.close();
        }
    }

    fn fail_send(&self, error: ChatError) {
        warn!("Send failed: {}", error);
        if self.sending.swap(false, Ordering::SeqCst) {
            self.emit(ChatEvent::Sending(false));
        }
        // Keep the user's input visible and answer it with a synthetic
        // bot-style notice instead of raising
        self.emit(ChatEvent::Message(NormalizedMessage::bot(
            self.local_id("local-error"),
            SEND_FAILURE_TEXT,
        )));
    }

    fn local_id(&self, prefix: &str) -> String {
        let seq = self.local_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", prefix, seq)
    }

    fn emit(&self, event: ChatEvent) {
        (self.on_event)(event);
    }

    fn set_state(&self, next: ConnectionState) {
        let mut state = self.state.lock();
        if *state == next {
            return;
        }
        *state = next;
        drop(state);
        self.emit(ChatEvent::Connection(next));
    }
}
