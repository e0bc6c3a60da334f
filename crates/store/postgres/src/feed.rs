use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use printdesk_core::OrderEvent;
use printdesk_store::{OrderFeed, OrderFeedSubscription, StoreError};

use crate::config::PostgresConfig;

/// Capacity of the broadcast channel between the listener task and feed
/// subscribers.
const FEED_CAPACITY: usize = 256;

/// Delay before re-listening after a connection-level listener error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Change feed over the orders table, driven by `LISTEN/NOTIFY`.
///
/// One background task holds the listening connection and fans payloads
/// out to every subscriber through a broadcast channel. sqlx's
/// `PgListener` reconnects on its own; notifications raised while the
/// connection was down are lost, which the bridge's polling fallback
/// tolerates by design.
pub struct PostgresOrderFeed {
    feed_tx: broadcast::Sender<OrderEvent>,
    listener_task: JoinHandle<()>,
}

impl PostgresOrderFeed {
    /// Start listening on the configured channel.
    pub async fn start(pool: &PgPool, config: &PostgresConfig) -> Result<Self, StoreError> {
        let mut listener = PgListener::connect_with(pool)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        listener
            .listen(&config.feed_channel)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let (feed_tx, _) = broadcast::channel(FEED_CAPACITY);
        let tx = feed_tx.clone();
        let channel = config.feed_channel.clone();

        let listener_task = tokio::spawn(async move {
            loop {
                match listener.recv().await {
                    Ok(notification) => {
                        match serde_json::from_str::<OrderEvent>(notification.payload()) {
                            Ok(event) => {
                                debug!(kind = ?event.kind, order_id = %event.order.id, "order feed event");
                                let _ = tx.send(event);
                            }
                            Err(e) => {
                                warn!(error = %e, channel, "undecodable order feed payload dropped");
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, channel, "order feed listener error, retrying");
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    }
                }
            }
        });

        Ok(Self {
            feed_tx,
            listener_task,
        })
    }
}

impl Drop for PostgresOrderFeed {
    fn drop(&mut self) {
        self.listener_task.abort();
    }
}

#[async_trait]
impl OrderFeed for PostgresOrderFeed {
    async fn subscribe(&self) -> Result<OrderFeedSubscription, StoreError> {
        Ok(OrderFeedSubscription::new(self.feed_tx.subscribe()))
    }
}
