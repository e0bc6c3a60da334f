use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use printdesk_core::{
    Order, OrderEvent, OrderStatus, PushSubscription, SubscriptionKeys, ValidOrderDraft,
};
use printdesk_store::subscription::check_subscription_input;
use printdesk_store::{
    OrderFeed, OrderFeedSubscription, OrderStore, StoreError, SubscriptionStore,
};

/// Capacity of the feed channel before slow subscribers start lagging.
const FEED_CAPACITY: usize = 256;

/// In-memory implementation of [`OrderStore`], [`SubscriptionStore`], and
/// [`OrderFeed`].
///
/// Subscriptions are keyed by endpoint, which makes the upsert/remove
/// conflict semantics fall out of the map itself.
pub struct MemoryStore {
    orders: DashMap<Uuid, Order>,
    subscriptions: DashMap<String, PushSubscription>,
    feed_tx: broadcast::Sender<OrderEvent>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        let (feed_tx, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            orders: DashMap::new(),
            subscriptions: DashMap::new(),
            feed_tx,
        }
    }

    fn publish(&self, event: OrderEvent) {
        // Nobody listening is fine; the feed is observer-only.
        let _ = self.feed_tx.send(event);
    }

    fn sorted_newest_first(mut orders: Vec<Order>) -> Vec<Order> {
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        orders
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert(&self, draft: ValidOrderDraft) -> Result<Order, StoreError> {
        let order = draft.into_order(Utc::now());
        self.orders.insert(order.id, order.clone());
        self.publish(OrderEvent::inserted(order.clone()));
        Ok(order)
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Order, StoreError> {
        let Some(mut entry) = self.orders.get_mut(&id) else {
            return Err(StoreError::NotFound(id));
        };
        let previous = entry.clone();
        entry.status = status;
        entry.cancellation_reason = if status == OrderStatus::Cancelled {
            cancellation_reason
        } else {
            None
        };
        entry.updated_at = Utc::now();
        let updated = entry.clone();
        drop(entry);

        self.publish(OrderEvent::updated(updated.clone(), Some(previous)));
        Ok(updated)
    }

    async fn get(&self, id: Uuid) -> Result<Order, StoreError> {
        self.orders
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError> {
        let orders = self
            .orders
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect();
        Ok(Self::sorted_newest_first(orders))
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.iter().map(|entry| entry.clone()).collect();
        Ok(Self::sorted_newest_first(orders))
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn upsert(
        &self,
        user_id: &str,
        endpoint: &str,
        keys: SubscriptionKeys,
    ) -> Result<PushSubscription, StoreError> {
        check_subscription_input(endpoint, &keys)?;
        // Re-registration replaces keys and owner in place; the row
        // identity and creation time survive.
        let existing = self
            .subscriptions
            .get(endpoint)
            .map(|entry| (entry.id, entry.created_at));
        let (id, created_at) = existing.unwrap_or_else(|| (Uuid::new_v4(), Utc::now()));
        let subscription = PushSubscription {
            id,
            user_id: user_id.to_owned(),
            endpoint: endpoint.to_owned(),
            keys,
            created_at,
        };
        self.subscriptions
            .insert(endpoint.to_owned(), subscription.clone());
        Ok(subscription)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<PushSubscription>, StoreError> {
        Ok(self
            .subscriptions
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.clone())
            .collect())
    }

    async fn remove(&self, endpoint: &str) -> Result<(), StoreError> {
        self.subscriptions.remove(endpoint);
        Ok(())
    }
}

#[async_trait]
impl OrderFeed for MemoryStore {
    async fn subscribe(&self) -> Result<OrderFeedSubscription, StoreError> {
        Ok(OrderFeedSubscription::new(self.feed_tx.subscribe()))
    }
}

#[cfg(test)]
mod tests {
    use printdesk_core::{OrderDraft, OrderEventKind};
    use printdesk_store::testing;

    use super::*;

    fn draft(user: &str) -> ValidOrderDraft {
        OrderDraft {
            user_id: user.to_owned(),
            file_url: "https://blobs.example/report.pdf".into(),
            file_name: "report.pdf".into(),
            file_type: "application/pdf".into(),
            ..OrderDraft::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn order_store_conformance() {
        let store = MemoryStore::new();
        testing::run_order_store_conformance_tests(&store)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn subscription_store_conformance() {
        let store = MemoryStore::new();
        testing::run_subscription_store_conformance_tests(&store)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn feed_observes_insert_and_update_in_order() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe().await.unwrap();

        let order = store.insert(draft("feed-user")).await.unwrap();
        store
            .update_status(order.id, OrderStatus::Processing, None)
            .await
            .unwrap();

        let first = sub.recv().await.unwrap();
        assert_eq!(first.kind, OrderEventKind::Inserted);
        assert_eq!(first.order.id, order.id);

        let second = sub.recv().await.unwrap();
        assert_eq!(second.kind, OrderEventKind::Updated);
        assert_eq!(second.order.status, OrderStatus::Processing);
        let previous = second.previous.expect("update carries the pre-image");
        assert_eq!(previous.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn feed_reaches_multiple_subscribers() {
        let store = MemoryStore::new();
        let mut a = store.subscribe().await.unwrap();
        let mut b = store.subscribe().await.unwrap();

        store.insert(draft("fanout-user")).await.unwrap();

        assert_eq!(a.recv().await.unwrap().kind, OrderEventKind::Inserted);
        assert_eq!(b.recv().await.unwrap().kind, OrderEventKind::Inserted);
    }
}
