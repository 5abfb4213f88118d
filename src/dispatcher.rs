//! In-process publish/subscribe fan-out for verified payment events.

use serde::Serialize;
use tokio::sync::broadcast;

/// Event published after a successful payment verification.
/// Broadcast only, never persisted — a listener that connects after a
/// publish never receives it retroactively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerifiedEvent {
    pub order_id: String,
    pub reference_id: String,
}

/// Events buffered per subscriber before a slow listener starts lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Broadcaster over the live-subscriber set.
///
/// Wraps a [`tokio::sync::broadcast`] channel: every registered receiver
/// gets each published event in publish order, and a receiver that has been
/// dropped falls out of the registry on its own — delivery is best-effort
/// and a disconnected subscriber never fails a publish.
pub struct Dispatcher {
    tx: broadcast::Sender<PaymentVerifiedEvent>,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Deliver `event` to every currently-registered subscriber.
    pub fn publish(&self, event: PaymentVerifiedEvent) {
        if self.tx.receiver_count() > 0 {
            let _ = self.tx.send(event);
        }
    }

    /// Register a new subscriber. Dropping the receiver unsubscribes it.
    pub fn subscribe(&self) -> broadcast::Receiver<PaymentVerifiedEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
