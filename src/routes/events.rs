use actix_web::{get, web, HttpResponse};
use futures::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use crate::metrics;
use crate::sse;
use crate::state::AppState;

/// Keeps the live-listener gauge honest: decremented when the response body
/// stream is dropped on disconnect.
struct ListenerGuard;

impl ListenerGuard {
    fn new() -> Self {
        metrics::EVENT_SUBSCRIBERS.inc();
        ListenerGuard
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        metrics::EVENT_SUBSCRIBERS.dec();
        tracing::debug!("event listener disconnected");
    }
}

/// GET /events — live channel for verified-payment notifications.
///
/// Every currently connected listener receives each `payment:verified`
/// event; a listener that connects after a publish never sees it. The
/// subscription ends when the client disconnects and the receiver drops out
/// of the dispatcher on its own.
#[get("/events")]
pub async fn events(state: web::Data<AppState>) -> HttpResponse {
    let rx = state.dispatcher.subscribe();
    let guard = ListenerGuard::new();
    tracing::debug!(
        subscribers = state.dispatcher.subscriber_count(),
        "event listener connected"
    );

    let hello = futures::stream::once(async { sse::comment("connected") });
    let notifications = BroadcastStream::new(rx).filter_map(|item| async move {
        match item {
            Ok(event) => Some(sse::named_event(
                "payment:verified",
                &serde_json::to_value(&event).unwrap_or_default(),
            )),
            // A lagged listener skips missed events rather than dropping
            Err(_) => None,
        }
    });

    let body = hello.chain(notifications).map(move |event| {
        let _ = &guard;
        Ok::<_, actix_web::Error>(web::Bytes::from(event))
    });

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .insert_header(("X-Accel-Buffering", "no"))
        .streaming(body)
}
