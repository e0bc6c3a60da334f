use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, warn};

use printdesk_core::{Notification, PushSubscription};
use printdesk_push::PushGateway;
use printdesk_store::SubscriptionStore;

use crate::report::{DeliveryOutcome, DeliveryReport};

/// Fans a notification out to every endpoint a user has registered.
///
/// The registry is read before every dispatch — no cached subscription
/// list can go stale between a subscribe call and a send.
pub struct Dispatcher {
    subscriptions: Arc<dyn SubscriptionStore>,
    gateway: Arc<dyn PushGateway>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(subscriptions: Arc<dyn SubscriptionStore>, gateway: Arc<dyn PushGateway>) -> Self {
        Self {
            subscriptions,
            gateway,
        }
    }

    /// Attempt delivery of `notification` to all of `user_id`'s
    /// endpoints.
    ///
    /// Attempts run concurrently and settle independently — one flaky
    /// endpoint never blocks or fails the others. The call itself cannot
    /// fail: registry lookup errors and per-endpoint failures are logged
    /// and reflected in the report, never raised. Endpoints the gateway
    /// reports permanently gone are removed from the registry before the
    /// report is returned.
    pub async fn notify(&self, user_id: &str, notification: &Notification) -> DeliveryReport {
        let subscriptions = match self.subscriptions.list_by_user(user_id).await {
            Ok(subs) => subs,
            Err(e) => {
                error!(user_id, error = %e, "subscription lookup failed, dispatch skipped");
                return DeliveryReport::default();
            }
        };

        if subscriptions.is_empty() {
            debug!(user_id, "no push subscriptions, nothing to deliver");
            return DeliveryReport::default();
        }

        let attempts = subscriptions
            .iter()
            .map(|subscription| self.attempt(subscription, notification));
        let outcomes = join_all(attempts).await;

        DeliveryReport { outcomes }
    }

    async fn attempt(
        &self,
        subscription: &PushSubscription,
        notification: &Notification,
    ) -> DeliveryOutcome {
        let endpoint = subscription.endpoint.clone();
        match self.gateway.send(subscription, notification).await {
            Ok(()) => {
                debug!(endpoint, "push delivered");
                DeliveryOutcome::Delivered { endpoint }
            }
            Err(e) if e.is_permanent() => {
                // The target is dead; prune it so future dispatches stop
                // paying for it. A failed prune is only logged — the next
                // Gone response will try again.
                warn!(endpoint, "endpoint gone, pruning subscription");
                if let Err(remove_err) = self.subscriptions.remove(&endpoint).await {
                    error!(endpoint, error = %remove_err, "failed to prune dead subscription");
                }
                DeliveryOutcome::Pruned { endpoint }
            }
            Err(e) => {
                warn!(endpoint, error = %e, "push delivery failed");
                DeliveryOutcome::Failed {
                    endpoint,
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use printdesk_core::SubscriptionKeys;
    use printdesk_push::MockPushGateway;
    use printdesk_store_memory::MemoryStore;

    use super::*;

    fn keys() -> SubscriptionKeys {
        SubscriptionKeys {
            p256dh: "pk".into(),
            auth: "ak".into(),
        }
    }

    fn dispatcher_with(gateway: MockPushGateway) -> (Dispatcher, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(gateway));
        (dispatcher, store)
    }

    #[tokio::test]
    async fn no_subscriptions_is_an_empty_report() {
        let (dispatcher, _store) = dispatcher_with(MockPushGateway::new());
        let report = dispatcher
            .notify("nobody", &Notification::new("T", "B"))
            .await;
        assert_eq!(report.attempted(), 0);
    }

    #[tokio::test]
    async fn delivers_to_every_endpoint() {
        let gateway = MockPushGateway::new();
        let (dispatcher, store) = dispatcher_with(gateway);
        store.upsert("u1", "ep-1", keys()).await.unwrap();
        store.upsert("u1", "ep-2", keys()).await.unwrap();

        let report = dispatcher.notify("u1", &Notification::new("T", "B")).await;
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.delivered(), 2);
    }

    #[tokio::test]
    async fn gone_endpoint_is_pruned_and_others_are_unaffected() {
        let gateway = MockPushGateway::new();
        gateway.fail_gone("ep-dead");
        let (dispatcher, store) = dispatcher_with(gateway);
        store.upsert("u1", "ep-dead", keys()).await.unwrap();
        store.upsert("u1", "ep-live", keys()).await.unwrap();

        let report = dispatcher.notify("u1", &Notification::new("T", "B")).await;
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.delivered(), 1);
        assert_eq!(report.pruned(), 1);

        // Only the dead endpoint was removed.
        let remaining = SubscriptionStore::list_by_user(store.as_ref(), "u1")
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].endpoint, "ep-live");
    }

    #[tokio::test]
    async fn transient_failure_keeps_the_subscription() {
        let gateway = MockPushGateway::new();
        gateway.fail_transient("ep-flaky");
        let (dispatcher, store) = dispatcher_with(gateway);
        store.upsert("u1", "ep-flaky", keys()).await.unwrap();

        let report = dispatcher.notify("u1", &Notification::new("T", "B")).await;
        assert_eq!(report.failed(), 1);
        assert_eq!(report.pruned(), 0);

        let remaining = SubscriptionStore::list_by_user(store.as_ref(), "u1")
            .await
            .unwrap();
        assert_eq!(remaining.len(), 1, "transient failure must not prune");
    }

    #[tokio::test]
    async fn dispatch_only_targets_the_addressed_user() {
        let gateway = MockPushGateway::new();
        let (dispatcher, store) = dispatcher_with(gateway);
        store.upsert("u1", "ep-u1", keys()).await.unwrap();
        store.upsert("u2", "ep-u2", keys()).await.unwrap();

        let report = dispatcher.notify("u1", &Notification::new("T", "B")).await;
        assert_eq!(report.attempted(), 1);
        assert!(matches!(
            &report.outcomes[0],
            DeliveryOutcome::Delivered { endpoint } if endpoint == "ep-u1"
        ));
    }
}
