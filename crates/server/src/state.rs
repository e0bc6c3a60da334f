use std::sync::Arc;

use tokio::sync::Mutex;

use printdesk_dispatch::Dispatcher;
use printdesk_engine::OrderEngine;
use printdesk_realtime::{BridgeHandle, BridgeOptions, ListingCache, OrderFeedBridge};
use printdesk_store::{OrderFeed, OrderStore, SubscriptionStore};

use crate::error::ServerError;

/// Shared handles behind the HTTP surface.
///
/// Constructed once at startup (or per test) and cloned into every
/// handler. All mutation of orders goes through `engine`; listing reads go
/// through `listings`, which the bridge keeps invalidated as the change
/// feed observes writes.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<OrderEngine>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
    pub feed: Arc<dyn OrderFeed>,
    pub listings: Arc<ListingCache>,
    // Held only to keep the bridge tasks alive for the server's lifetime.
    _bridge: Arc<Mutex<BridgeHandle>>,
}

impl AppState {
    /// Wire the handles together and start the listing-cache bridge.
    pub async fn new(
        engine: Arc<OrderEngine>,
        orders: Arc<dyn OrderStore>,
        subscriptions: Arc<dyn SubscriptionStore>,
        feed: Arc<dyn OrderFeed>,
        bridge_options: BridgeOptions,
    ) -> Result<Self, ServerError> {
        let listings = Arc::new(ListingCache::new(orders));
        let bridge =
            OrderFeedBridge::subscribe(feed.as_ref(), Arc::clone(&listings), bridge_options)
                .await?;
        Ok(Self {
            engine,
            subscriptions,
            feed,
            listings,
            _bridge: Arc::new(Mutex::new(bridge)),
        })
    }

    /// Full stack over the in-memory backend with the given push gateway.
    /// The construction path used by tests and memory-backend deployments.
    pub async fn in_memory(
        gateway: Arc<dyn printdesk_push::PushGateway>,
    ) -> Result<Self, ServerError> {
        let store = Arc::new(printdesk_store_memory::MemoryStore::new());
        let dispatcher = Arc::new(Dispatcher::new(store.clone(), gateway));
        let engine = Arc::new(OrderEngine::new(store.clone(), dispatcher));
        Self::new(
            engine,
            store.clone(),
            store.clone(),
            store,
            BridgeOptions::default(),
        )
        .await
    }
}
