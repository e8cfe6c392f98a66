use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::message::{classify, NormalizedMessage};
use crate::transport::RawInboundMessage;
use crate::utils::ChatError;

/// Callback invoked for each newly delivered bot message.
pub type MessageCallback = Arc<dyn Fn(NormalizedMessage) + Send + Sync>;

/// Callback invoked for observability on non-fatal delivery errors.
pub type ErrorCallback = Arc<dyn Fn(ChatError) + Send + Sync>;

struct SinkState {
    seen: HashSet<String>,
    closed: bool,
}

/// The single merge point both producers feed.
///
/// Owns the dedup set and the closed flag, and fires callbacks under the
/// lock: a callback racing with `close()` either completes before it
/// returns or never fires at all.
pub(super) struct DeliverySink {
    state: Mutex<SinkState>,
    on_message: MessageCallback,
    on_error: ErrorCallback,
}

impl DeliverySink {
    pub(super) fn new(on_message: MessageCallback, on_error: ErrorCallback) -> Self {
        Self {
            state: Mutex::new(SinkState {
                seen: HashSet::new(),
                closed: false,
            }),
            on_message,
            on_error,
        }
    }

    /// Record one raw record and deliver it if it is new and
    /// bot-attributed. Non-bot records are still recorded so a later
    /// producer will not reconsider them.
    pub(super) fn deliver(&self, raw: &RawInboundMessage) {
        let is_from_bot = classify(raw);

        let mut state = self.state.lock();
        if state.closed || !state.seen.insert(raw.id.clone()) {
            return;
        }
        if !is_from_bot {
            trace!(id = %raw.id, "suppressing user-origin record");
            return;
        }
        (self.on_message)(NormalizedMessage::from_raw(raw, true));
    }

    /// Report a non-fatal error unless the sink is closed.
    pub(super) fn report(&self, error: ChatError) {
        let state = self.state.lock();
        if state.closed {
            return;
        }
        (self.on_error)(error);
    }

    /// Mark the sink closed. Idempotent.
    pub(super) fn close(&self) {
        self.state.lock().closed = true;
    }
}
