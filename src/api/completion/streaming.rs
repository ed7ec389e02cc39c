//! Relay orchestration: one session per inbound completion request.
//!
//! A session emits `start`, zero or more cumulative `answer` events and
//! exactly one terminal `done` event into its channel. Every upstream await
//! races against channel closure, so a disconnected client cancels the
//! in-flight upstream call at the next suspension point.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::types::{
    AnswerData, CompletionRequest, CompletionStreamEvent, DoneData, DoneStatus, StartData,
};
use crate::ai::providers::{AIProvider, ChatRequest, ProviderError};
use futures_util::StreamExt;

pub(super) type EventSender = UnboundedSender<CompletionStreamEvent>;

/// Hook invoked at most once, after the terminal event of a successfully
/// completed session has been queued.
pub(super) type FinishHook = Box<dyn FnOnce() + Send>;

/// Why a relay session ended. Exactly one `done` event is derived from this.
#[derive(Debug)]
pub(super) enum RelayOutcome {
    Complete,
    Aborted,
    Failed(ProviderError),
}

impl RelayOutcome {
    fn status(&self) -> DoneStatus {
        match self {
            RelayOutcome::Complete => DoneStatus::Complete,
            RelayOutcome::Aborted => DoneStatus::Aborted,
            RelayOutcome::Failed(_) => DoneStatus::Error,
        }
    }
}

/// Run one relay session end to end. The terminal `done` event is emitted on
/// every exit path; abort is an expected outcome, not a fault.
pub(super) async fn execute_stream(
    tx: EventSender,
    request: CompletionRequest,
    provider: Arc<dyn AIProvider>,
    on_finish: Option<FinishHook>,
) -> RelayOutcome {
    send_event(
        &tx,
        CompletionStreamEvent::Start(StartData {
            scope: request.scope(),
        }),
    );

    let outcome = relay_upstream(&tx, &request, provider.as_ref()).await;

    match &outcome {
        RelayOutcome::Complete => {
            tracing::info!(thread_id = %request.thread_id, "completion stream finished")
        }
        RelayOutcome::Aborted => {
            tracing::info!(thread_id = %request.thread_id, "completion stream aborted by client")
        }
        RelayOutcome::Failed(err) => {
            tracing::error!(thread_id = %request.thread_id, error = %err, "completion stream failed")
        }
    }

    send_event(
        &tx,
        CompletionStreamEvent::Done(DoneData {
            scope: request.scope(),
            status: outcome.status(),
            error: match &outcome {
                RelayOutcome::Failed(err) => Some(err.to_string()),
                _ => None,
            },
        }),
    );

    if matches!(outcome, RelayOutcome::Complete) {
        if let Some(hook) = on_finish {
            hook();
        }
    }

    outcome
}

/// Relay provider deltas into cumulative answer events.
async fn relay_upstream(
    tx: &EventSender,
    request: &CompletionRequest,
    provider: &dyn AIProvider,
) -> RelayOutcome {
    let chat_request = ChatRequest {
        model: provider.model().to_string(),
        messages: request.chat_messages(),
        stream: true,
    };

    let mut stream = tokio::select! {
        _ = tx.closed() => return RelayOutcome::Aborted,
        result = provider.chat_stream(chat_request) => match result {
            Ok(stream) => stream,
            Err(err) => return RelayOutcome::Failed(err),
        },
    };

    // Dropping `stream` on any return below also aborts the outbound call.
    let mut full_text = String::new();
    loop {
        let chunk = tokio::select! {
            _ = tx.closed() => return RelayOutcome::Aborted,
            chunk = stream.next() => chunk,
        };

        match chunk {
            None => return RelayOutcome::Complete,
            Some(Ok(chunk)) => {
                if let Some(content) = chunk.content {
                    full_text.push_str(&content);
                    send_event(
                        tx,
                        CompletionStreamEvent::Answer(AnswerData::new(request, &full_text)),
                    );
                }
                if chunk.finish_reason.is_some() {
                    return RelayOutcome::Complete;
                }
            }
            Some(Err(err)) => return RelayOutcome::Failed(err),
        }
    }
}

fn send_event(tx: &EventSender, event: CompletionStreamEvent) {
    // The receiver may already be gone on the abort path; nothing to do then.
    let _ = tx.send(event);
}
