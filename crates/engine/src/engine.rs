use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use printdesk_core::notification::DEFAULT_CANCELLATION_REASON;
use printdesk_core::{Notification, Order, OrderDraft, OrderStatus};
use printdesk_dispatch::Dispatcher;
use printdesk_store::OrderStore;

use crate::error::EngineError;

/// Enforces the order lifecycle and sequences persist-then-notify.
pub struct OrderEngine {
    store: Arc<dyn OrderStore>,
    dispatcher: Arc<Dispatcher>,
}

impl OrderEngine {
    #[must_use]
    pub fn new(store: Arc<dyn OrderStore>, dispatcher: Arc<Dispatcher>) -> Self {
        Self { store, dispatcher }
    }

    /// Validate and persist a new order.
    ///
    /// Creation is silent: the submitter already knows they submitted, so
    /// no notification is dispatched.
    pub async fn create(&self, draft: OrderDraft) -> Result<Order, EngineError> {
        let valid = draft.validate()?;
        let order = self.store.insert(valid).await?;
        info!(order_id = %order.id, user_id = %order.user_id, "order created");
        Ok(order)
    }

    /// Move an order to `target`, then announce the change to its owner.
    ///
    /// Phase 1 is awaited: fetch, check the transition table, persist.
    /// Any failure here aborts the call and no notification is attempted.
    /// Phase 2 is spawned and never joined into this result: once the
    /// write commits, the order is in its new state regardless of whether
    /// anyone could be told, so delivery outcomes are only logged.
    ///
    /// `reason` is only meaningful when `target` is
    /// [`OrderStatus::Cancelled`]; the stored reason then defaults to
    /// "Cancelled by admin" when none is supplied, while the notification
    /// body falls back to a generic contact-the-store message.
    pub async fn transition(
        &self,
        order_id: Uuid,
        target: OrderStatus,
        reason: Option<String>,
    ) -> Result<Order, EngineError> {
        let current = self.store.get(order_id).await?;
        if !current.status.can_transition_to(target) {
            return Err(EngineError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        let stored_reason = if target == OrderStatus::Cancelled {
            Some(
                reason
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CANCELLATION_REASON.to_owned()),
            )
        } else {
            None
        };

        let updated = self
            .store
            .update_status(order_id, target, stored_reason)
            .await?;
        info!(
            order_id = %updated.id,
            from = %current.status,
            to = %updated.status,
            "order transitioned"
        );

        // The notification body quotes the reason only when staff actually
        // gave one.
        if let Some(notification) = Notification::for_transition(target, reason.as_deref()) {
            self.spawn_notify(updated.user_id.clone(), notification);
        }

        Ok(updated)
    }

    fn spawn_notify(&self, user_id: String, notification: Notification) {
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            let report = dispatcher.notify(&user_id, &notification).await;
            if report.failed() > 0 || report.pruned() > 0 {
                warn!(
                    user_id,
                    attempted = report.attempted(),
                    delivered = report.delivered(),
                    pruned = report.pruned(),
                    failed = report.failed(),
                    "push dispatch settled with failures"
                );
            } else {
                info!(
                    user_id,
                    attempted = report.attempted(),
                    delivered = report.delivered(),
                    "push dispatch settled"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use printdesk_core::{ColorMode, SubscriptionKeys, ValidOrderDraft};
    use printdesk_push::MockPushGateway;
    use printdesk_store::{StoreError, SubscriptionStore};
    use printdesk_store_memory::MemoryStore;
    use tokio::sync::mpsc;

    use super::*;

    const RECV_TIMEOUT: Duration = Duration::from_secs(2);

    fn draft() -> OrderDraft {
        OrderDraft {
            user_id: "student-1".into(),
            file_url: "https://blobs.example/report.pdf".into(),
            file_name: "report.pdf".into(),
            file_type: "application/pdf".into(),
            quantity: Some(3),
            color_mode: ColorMode::Color,
            ..OrderDraft::default()
        }
    }

    fn keys() -> SubscriptionKeys {
        SubscriptionKeys {
            p256dh: "pk".into(),
            auth: "ak".into(),
        }
    }

    struct Rig {
        engine: OrderEngine,
        store: Arc<MemoryStore>,
        attempts: mpsc::UnboundedReceiver<printdesk_push::SentPush>,
    }

    fn rig() -> Rig {
        let store = Arc::new(MemoryStore::new());
        let (gateway, attempts) = MockPushGateway::with_channel();
        let dispatcher = Arc::new(Dispatcher::new(store.clone(), Arc::new(gateway)));
        let engine = OrderEngine::new(store.clone(), dispatcher);
        Rig {
            engine,
            store,
            attempts,
        }
    }

    async fn next_push(rig: &mut Rig) -> printdesk_push::SentPush {
        tokio::time::timeout(RECV_TIMEOUT, rig.attempts.recv())
            .await
            .expect("notification should be dispatched")
            .expect("mock channel should stay open")
    }

    #[tokio::test]
    async fn create_starts_pending_and_is_silent() {
        let mut rig = rig();
        rig.store.upsert("student-1", "ep-1", keys()).await.unwrap();

        let order = rig.engine.create(draft()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.quantity, 3);
        assert_eq!(order.color_mode, ColorMode::Color);

        // No dispatch happens for creation.
        let silent =
            tokio::time::timeout(Duration::from_millis(100), rig.attempts.recv()).await;
        assert!(silent.is_err(), "creation must not notify");
    }

    #[tokio::test]
    async fn create_rejects_invalid_draft() {
        let rig = rig();
        let mut bad = draft();
        bad.file_url.clear();
        assert!(matches!(
            rig.engine.create(bad).await,
            Err(EngineError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn create_then_advance_notifies_with_status_specific_titles() {
        let mut rig = rig();
        rig.store.upsert("student-1", "ep-1", keys()).await.unwrap();

        let order = rig.engine.create(draft()).await.unwrap();

        let processing = rig
            .engine
            .transition(order.id, OrderStatus::Processing, None)
            .await
            .unwrap();
        assert_eq!(processing.status, OrderStatus::Processing);
        let push = next_push(&mut rig).await;
        assert_eq!(push.notification.title, "🖨️ Printing Started");
        assert_eq!(push.user_id, "student-1");

        let completed = rig
            .engine
            .transition(order.id, OrderStatus::Completed, None)
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        let push = next_push(&mut rig).await;
        assert_eq!(push.notification.title, "✅ Ready for Pickup!");
    }

    #[tokio::test]
    async fn valid_transitions_strictly_bump_updated_at() {
        let rig = rig();
        let order = rig.engine.create(draft()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
        let updated = rig
            .engine
            .transition(order.id, OrderStatus::Processing, None)
            .await
            .unwrap();
        assert!(updated.updated_at > order.updated_at);
    }

    #[tokio::test]
    async fn invalid_transitions_are_rejected_and_leave_the_row_unchanged() {
        let rig = rig();

        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                if from.can_transition_to(to) {
                    continue;
                }
                // Seed the order at `from` directly, bypassing the engine.
                let order = rig.engine.create(draft()).await.unwrap();
                let seeded = if from == OrderStatus::Pending {
                    order
                } else {
                    rig.store
                        .update_status(order.id, from, Some("seed".to_owned()))
                        .await
                        .unwrap()
                };

                let result = rig.engine.transition(seeded.id, to, None).await;
                assert!(
                    matches!(
                        result,
                        Err(EngineError::InvalidTransition { from: f, to: t })
                            if f == from && t == to
                    ),
                    "{from} -> {to} should be rejected"
                );

                let stored = rig.store.get(seeded.id).await.unwrap();
                assert_eq!(stored, seeded, "rejected transition must not mutate the row");
            }
        }
    }

    #[tokio::test]
    async fn unknown_order_is_not_found() {
        let rig = rig();
        assert!(matches!(
            rig.engine
                .transition(Uuid::new_v4(), OrderStatus::Processing, None)
                .await,
            Err(EngineError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn cancellation_with_reason_stores_and_announces_it() {
        let mut rig = rig();
        rig.store.upsert("student-1", "ep-1", keys()).await.unwrap();

        let order = rig.engine.create(draft()).await.unwrap();
        let cancelled = rig
            .engine
            .transition(order.id, OrderStatus::Cancelled, Some("Out of paper".into()))
            .await
            .unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Out of paper"));

        let push = next_push(&mut rig).await;
        assert_eq!(push.notification.title, "❌ Order Cancelled");
        assert!(push.notification.body.contains("Out of paper"));
    }

    #[tokio::test]
    async fn cancellation_without_reason_defaults_and_uses_generic_body() {
        let mut rig = rig();
        rig.store.upsert("student-1", "ep-1", keys()).await.unwrap();

        let order = rig.engine.create(draft()).await.unwrap();
        let cancelled = rig
            .engine
            .transition(order.id, OrderStatus::Cancelled, None)
            .await
            .unwrap();
        assert_eq!(
            cancelled.cancellation_reason.as_deref(),
            Some("Cancelled by admin")
        );

        let push = next_push(&mut rig).await;
        assert!(push.notification.body.contains("contact the store"));
        assert!(!push.notification.body.contains("Cancelled by admin"));
    }

    #[tokio::test]
    async fn delivery_failure_never_fails_the_transition() {
        let store = Arc::new(MemoryStore::new());
        let gateway = MockPushGateway::new();
        gateway.fail_transient("ep-flaky");
        let dispatcher = Arc::new(Dispatcher::new(store.clone(), Arc::new(gateway)));
        let engine = OrderEngine::new(store.clone(), dispatcher);

        store.upsert("student-1", "ep-flaky", keys()).await.unwrap();
        let order = engine.create(draft()).await.unwrap();
        let updated = engine
            .transition(order.id, OrderStatus::Processing, None)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Processing);
    }

    /// Store double whose writes fail, to prove persistence failure stops
    /// the call before any notification.
    struct BrokenStore;

    #[async_trait]
    impl OrderStore for BrokenStore {
        async fn insert(&self, _draft: ValidOrderDraft) -> Result<Order, StoreError> {
            Err(StoreError::Backend("disk on fire".into()))
        }

        async fn update_status(
            &self,
            _id: Uuid,
            _status: OrderStatus,
            _reason: Option<String>,
        ) -> Result<Order, StoreError> {
            Err(StoreError::Backend("disk on fire".into()))
        }

        async fn get(&self, id: Uuid) -> Result<Order, StoreError> {
            // Pretend the row exists at Pending so the transition check
            // passes and the failure comes from the write itself.
            let order = draft().validate().unwrap().into_order(chrono::Utc::now());
            Ok(Order { id, ..order })
        }

        async fn list_by_user(&self, _user_id: &str) -> Result<Vec<Order>, StoreError> {
            Ok(Vec::new())
        }

        async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn persistence_failure_aborts_before_any_notification() {
        let subs = Arc::new(MemoryStore::new());
        let (gateway, mut attempts) = MockPushGateway::with_channel();
        let dispatcher = Arc::new(Dispatcher::new(subs.clone(), Arc::new(gateway)));
        let engine = OrderEngine::new(Arc::new(BrokenStore), dispatcher);

        subs.upsert("student-1", "ep-1", keys()).await.unwrap();

        let result = engine
            .transition(Uuid::new_v4(), OrderStatus::Processing, None)
            .await;
        assert!(matches!(result, Err(EngineError::Store(_))));

        let silent = tokio::time::timeout(Duration::from_millis(100), attempts.recv()).await;
        assert!(silent.is_err(), "failed persistence must not notify");
    }
}
