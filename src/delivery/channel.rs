use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use tokio::time::{interval, Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::sink::{DeliverySink, ErrorCallback, MessageCallback};
use crate::constants::PULL_INTERVAL_MS;
use crate::session::Session;
use crate::transport::{MessagePayload, PushEvent, RawInboundMessage, Transport};
use crate::utils::ChatError;

/// Counter for ids synthesized from unparseable push payloads
static RAW_EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Dual-mode delivery of bot messages: a live push subscription first,
/// with a one-way fallback to polling when push fails. Each distinct
/// message id reaches the caller at most once per subscription.
pub struct DeliveryChannel;

/// Cancelable handle for one open subscription.
pub struct DeliveryHandle {
    sink: Arc<DeliverySink>,
    cancel: CancellationToken,
}

impl DeliveryHandle {
    /// Stop both push and pull activity. Idempotent; no callback fires
    /// after this returns.
    pub fn close(&self) {
        self.sink.close();
        self.cancel.cancel();
    }
}

impl Drop for DeliveryHandle {
    fn drop(&mut self) {
        self.close();
    }
}

impl DeliveryChannel {
    /// Open a subscription for the session's conversation. Bot messages
    /// flow to `on_message`, non-fatal errors to `on_error`, until the
    /// returned handle is closed.
    pub fn open(
        transport: Arc<dyn Transport>,
        session: Arc<Session>,
        on_message: MessageCallback,
        on_error: ErrorCallback,
    ) -> DeliveryHandle {
        let sink = Arc::new(DeliverySink::new(on_message, on_error));
        let cancel = CancellationToken::new();

        let task_sink = Arc::clone(&sink);
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            run_subscription(transport, session, task_sink, task_cancel).await;
        });

        DeliveryHandle { sink, cancel }
    }
}

enum PushOutcome {
    /// The handle was closed; stop entirely.
    Closed,
    /// The push channel failed; switch to pull.
    Failed(ChatError),
}

/// Push phase first; any push failure is a one-way transition to pull.
async fn run_subscription(
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    sink: Arc<DeliverySink>,
    cancel: CancellationToken,
) {
    match run_push(&*transport, &session, &sink, &cancel).await {
        PushOutcome::Closed => return,
        PushOutcome::Failed(error) => {
            warn!("Push subscription failed, falling back to polling: {}", error);
            // Whatever took the push channel down, the caller sees a
            // stream failure: it is non-fatal by contract
            let error = match error {
                stream @ ChatError::Stream(_) => stream,
                other => ChatError::Stream(other.to_string()),
            };
            sink.report(error);
        }
    }
    run_pull(&*transport, &session, &sink, &cancel).await;
}

async fn run_push(
    transport: &dyn Transport,
    session: &Session,
    sink: &DeliverySink,
    cancel: &CancellationToken,
) -> PushOutcome {
    let mut stream = tokio::select! {
        _ = cancel.cancelled() => return PushOutcome::Closed,
        opened = transport.open_push_stream(session) => match opened {
            Ok(stream) => stream,
            Err(e) => return PushOutcome::Failed(e),
        },
    };
    debug!(
        "Push subscription open for conversation {}",
        session.conversation_id
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return PushOutcome::Closed,
            event = stream.next() => match event {
                Some(Ok(event)) => sink.deliver(&decode_push_event(event)),
                Some(Err(e)) => return PushOutcome::Failed(e),
                None => {
                    return PushOutcome::Failed(ChatError::Stream(
                        "push stream closed unexpectedly".to_string(),
                    ))
                }
            },
        }
    }
}

/// Decode one push event. Unparseable payloads degrade to a synthetic
/// text record rather than being dropped.
fn decode_push_event(event: PushEvent) -> RawInboundMessage {
    match serde_json::from_str::<RawInboundMessage>(&event.data) {
        Ok(raw) => raw,
        Err(_) => {
            let seq = RAW_EVENT_SEQ.fetch_add(1, Ordering::Relaxed);
            RawInboundMessage {
                id: format!("push-raw-{}", seq),
                payload: Some(MessagePayload {
                    kind: Some("text".to_string()),
                    text: Some(event.data),
                    from_user: None,
                    author_id: None,
                }),
                text: None,
                author_id: None,
                direction: None,
            }
        }
    }
}

/// Poll the conversation until cancelled. A failing tick is reported
/// and polling continues.
async fn run_pull(
    transport: &dyn Transport,
    session: &Session,
    sink: &DeliverySink,
    cancel: &CancellationToken,
) {
    let mut ticker = interval(Duration::from_millis(PULL_INTERVAL_MS));
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = ticker.tick() => {
                match transport.list_messages(session).await {
                    Ok(records) => {
                        for record in &records {
                            sink.deliver(record);
                        }
                    }
                    Err(e) => sink.report(e),
                }
            }
        }
    }
}
