use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use printdesk_core::{Order, OrderEventKind};
use printdesk_store::{OrderFeed, StoreError};

use crate::cache::ListingCache;

/// Event forwarded to the view layer.
///
/// The staff dashboard reacts to `NewOrder` (surface the job, play the
/// alert sound); both variants arrive after the caches have already been
/// invalidated, so a view that re-fetches on receipt sees fresh data.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    NewOrder(Order),
    OrderUpdated(Order),
}

/// Tuning for one bridge subscription.
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Interval of the redundant polling fallback. `None` disables it
    /// (tests that want feed-only behavior).
    pub poll_interval: Option<Duration>,

    /// Capacity of the event channel toward the view layer.
    pub channel_capacity: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            poll_interval: Some(Duration::from_secs(30)),
            channel_capacity: 64,
        }
    }
}

/// Consumes the order change feed on behalf of one open view.
pub struct OrderFeedBridge;

impl OrderFeedBridge {
    /// Subscribe to `feed` and start fanning out.
    ///
    /// Two tasks run until the returned handle is dropped or
    /// [`BridgeHandle::unsubscribe`] is called: the feed consumer, which
    /// invalidates `cache` and forwards insert/update events, and the
    /// polling fallback, which invalidates `cache` every tick so a
    /// silently dead feed connection degrades to eventual consistency
    /// instead of a frozen view.
    pub async fn subscribe(
        feed: &dyn OrderFeed,
        cache: Arc<ListingCache>,
        options: BridgeOptions,
    ) -> Result<BridgeHandle, StoreError> {
        let mut subscription = feed.subscribe().await?;
        let (tx, rx) = mpsc::channel(options.channel_capacity);

        let feed_cache = Arc::clone(&cache);
        let feed_task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                debug!(kind = ?event.kind, order_id = %event.order.id, "bridge observed order event");
                // Invalidate before forwarding so a view that re-fetches
                // on receipt cannot read a stale listing.
                feed_cache.invalidate_all();
                let forwarded = match event.kind {
                    OrderEventKind::Inserted => Some(BridgeEvent::NewOrder(event.order)),
                    OrderEventKind::Updated => Some(BridgeEvent::OrderUpdated(event.order)),
                    OrderEventKind::Deleted => None,
                };
                if let Some(forwarded) = forwarded {
                    // Lossy toward the view: a full or closed channel
                    // costs the view this event but never stalls feed
                    // consumption; the invalidation already happened.
                    match tx.try_send(forwarded) {
                        Ok(()) | Err(mpsc::error::TrySendError::Closed(_)) => {}
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            debug!("bridge event channel full, event dropped");
                        }
                    }
                }
            }
            debug!("order feed closed, bridge consumer exiting");
        });

        let poll_task = options.poll_interval.map(|interval| {
            let poll_cache = Arc::clone(&cache);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                // The immediate first tick would invalidate a cache nobody
                // has read yet; skip it.
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    debug!("polling fallback invalidating listings");
                    poll_cache.invalidate_all();
                }
            })
        });

        Ok(BridgeHandle {
            events: rx,
            feed_task,
            poll_task,
        })
    }
}

/// Live handle on a bridge subscription.
pub struct BridgeHandle {
    /// Events for the view layer, in feed order.
    pub events: mpsc::Receiver<BridgeEvent>,
    feed_task: JoinHandle<()>,
    poll_task: Option<JoinHandle<()>>,
}

impl BridgeHandle {
    /// Stop consuming the feed and the polling fallback. Dropping the
    /// handle has the same effect.
    pub fn unsubscribe(&mut self) {
        self.feed_task.abort();
        if let Some(poll) = &self.poll_task {
            poll.abort();
        }
    }
}

impl Drop for BridgeHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
