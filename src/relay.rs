//! Streaming relay: pumps upstream text fragments to one client as SSE.
//!
//! One session per generation request. The session exclusively owns its
//! upstream fragment stream and its half of the wire channel; it is
//! destroyed when a terminal state is reached or the client goes away.

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

use crate::error::GatewayError;
use crate::sse;

/// Lifecycle of one streaming generation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    pub fn as_label(&self) -> &'static str {
        match self {
            SessionState::Init => "init",
            SessionState::Streaming => "streaming",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

/// Wire channel capacity. Capacity 1 means the next upstream pull happens
/// only after the previous wire event has been taken by the response body,
/// so a slow client throttles the upstream read rate instead of filling a
/// buffer.
pub const WIRE_BUFFER: usize = 1;

/// Pump fragments into the wire channel until a terminal state is reached.
///
/// Protocol: one `data: {"text": ...}` event per non-empty fragment, then
/// exactly one terminal event — `event: done` on normal exhaustion, or a
/// `data: {"error": ...}` event when the upstream fails mid-stream (the raw
/// upstream error is logged, never sent). Fragments already written are
/// never retracted. A failed send means the client disconnected: the relay
/// stops pulling, drops the upstream stream, and writes nothing further.
pub async fn relay_fragments<S>(mut fragments: S, tx: mpsc::Sender<String>) -> SessionState
where
    S: Stream<Item = Result<String, GatewayError>> + Unpin,
{
    let mut state = SessionState::Init;

    loop {
        match fragments.next().await {
            Some(Ok(fragment)) => {
                if fragment.is_empty() {
                    continue;
                }
                let event = sse::data_event(&serde_json::json!({ "text": fragment }));
                if tx.send(event).await.is_err() {
                    tracing::debug!("client disconnected mid-stream, cancelling session");
                    return SessionState::Cancelled;
                }
                state = SessionState::Streaming;
            }
            Some(Err(e)) => {
                let mid_stream = state == SessionState::Streaming;
                tracing::error!(error = %e, mid_stream, "upstream generation failed");
                let event = sse::data_event(&serde_json::json!({ "error": "generation failed" }));
                return if tx.send(event).await.is_err() {
                    SessionState::Cancelled
                } else {
                    SessionState::Failed
                };
            }
            None => {
                let event = sse::named_event("done", &serde_json::json!({}));
                return if tx.send(event).await.is_err() {
                    SessionState::Cancelled
                } else {
                    SessionState::Completed
                };
            }
        }
    }
}
