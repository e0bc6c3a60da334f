use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::warn;

use printdesk_core::OrderEvent;

use crate::error::StoreError;

/// A subscribable stream of row-level mutation events on the order table.
///
/// The feed is eventually consistent and lossy under backpressure: a slow
/// subscriber may miss events. Consumers that need completeness (the
/// realtime bridge) pair the feed with a polling fallback over the same
/// store, which is safe because both paths are read-only and converge.
#[async_trait]
pub trait OrderFeed: Send + Sync {
    /// Open a new subscription covering all event kinds.
    async fn subscribe(&self) -> Result<OrderFeedSubscription, StoreError>;
}

/// A live handle on the order change feed.
///
/// Backed by a broadcast channel regardless of backend: the in-memory
/// store publishes directly, the Postgres backend forwards `LISTEN/NOTIFY`
/// payloads into one. Dropping the subscription releases the underlying
/// receiver.
pub struct OrderFeedSubscription {
    rx: broadcast::Receiver<OrderEvent>,
}

impl OrderFeedSubscription {
    #[must_use]
    pub fn new(rx: broadcast::Receiver<OrderEvent>) -> Self {
        Self { rx }
    }

    /// Receive the next event. Returns `None` once the feed is closed.
    ///
    /// A lagged receiver skips the dropped events and keeps going; the
    /// gap is logged and left to the polling fallback to repair.
    pub async fn recv(&mut self) -> Option<OrderEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "order feed subscriber lagged, events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use printdesk_core::{OrderDraft, OrderEventKind};

    use super::*;

    fn sample_event() -> OrderEvent {
        let order = OrderDraft {
            user_id: "u1".into(),
            file_url: "https://blobs.example/a.pdf".into(),
            file_name: "a.pdf".into(),
            file_type: "application/pdf".into(),
            ..OrderDraft::default()
        }
        .validate()
        .unwrap()
        .into_order(Utc::now());
        OrderEvent::inserted(order)
    }

    #[tokio::test]
    async fn recv_returns_published_event() {
        let (tx, rx) = broadcast::channel(8);
        let mut sub = OrderFeedSubscription::new(rx);
        tx.send(sample_event()).unwrap();
        let event = sub.recv().await.unwrap();
        assert_eq!(event.kind, OrderEventKind::Inserted);
    }

    #[tokio::test]
    async fn recv_returns_none_when_closed() {
        let (tx, rx) = broadcast::channel::<OrderEvent>(8);
        let mut sub = OrderFeedSubscription::new(rx);
        drop(tx);
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn lagged_receiver_skips_and_continues() {
        let (tx, rx) = broadcast::channel(1);
        let mut sub = OrderFeedSubscription::new(rx);
        // Overflow the single-slot channel so the receiver lags.
        tx.send(sample_event()).unwrap();
        tx.send(sample_event()).unwrap();
        tx.send(sample_event()).unwrap();
        // The oldest events are gone but recv still yields the newest.
        assert!(sub.recv().await.is_some());
    }
}
