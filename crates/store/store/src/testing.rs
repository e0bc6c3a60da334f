//! Conformance test suites for store backends.
//!
//! Call these from a backend's test module with a fresh store instance;
//! they exercise the contract every implementation must honor, including
//! the upsert law, idempotent removal, and the cancellation-reason
//! invariant.

use std::time::Duration;

use printdesk_core::{OrderDraft, OrderStatus, SubscriptionKeys, ValidOrderDraft};

use crate::error::StoreError;
use crate::order::OrderStore;
use crate::subscription::SubscriptionStore;

fn draft_for(user_id: &str, file_name: &str) -> ValidOrderDraft {
    OrderDraft {
        user_id: user_id.to_owned(),
        file_url: format!("https://blobs.example/{file_name}"),
        file_name: file_name.to_owned(),
        file_type: "application/pdf".to_owned(),
        ..OrderDraft::default()
    }
    .validate()
    .expect("test draft should validate")
}

fn keys(tag: &str) -> SubscriptionKeys {
    SubscriptionKeys {
        p256dh: format!("p256dh-{tag}"),
        auth: format!("auth-{tag}"),
    }
}

/// Run the full order store conformance suite.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_order_store_conformance_tests(store: &dyn OrderStore) -> Result<(), StoreError> {
    test_insert_starts_pending(store).await?;
    test_get_missing_is_not_found(store).await?;
    test_update_status_persists_and_bumps_updated_at(store).await?;
    test_update_status_missing_is_not_found(store).await?;
    test_cancellation_reason_set_only_when_cancelled(store).await?;
    test_listings_newest_first(store).await?;
    Ok(())
}

async fn test_insert_starts_pending(store: &dyn OrderStore) -> Result<(), StoreError> {
    let order = store.insert(draft_for("conf-user", "insert.pdf")).await?;
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.cancellation_reason, None);
    assert!(order.updated_at >= order.created_at);

    let fetched = store.get(order.id).await?;
    assert_eq!(fetched, order);
    Ok(())
}

async fn test_get_missing_is_not_found(store: &dyn OrderStore) -> Result<(), StoreError> {
    let missing = uuid::Uuid::new_v4();
    match store.get(missing).await {
        Err(StoreError::NotFound(id)) => assert_eq!(id, missing),
        other => panic!("expected NotFound, got {other:?}"),
    }
    Ok(())
}

async fn test_update_status_persists_and_bumps_updated_at(
    store: &dyn OrderStore,
) -> Result<(), StoreError> {
    let order = store.insert(draft_for("conf-user", "bump.pdf")).await?;

    // Guarantee a clock tick so the bump is strictly greater.
    tokio::time::sleep(Duration::from_millis(5)).await;

    let updated = store
        .update_status(order.id, OrderStatus::Processing, None)
        .await?;
    assert_eq!(updated.status, OrderStatus::Processing);
    assert!(updated.updated_at > order.updated_at, "updated_at must strictly increase");
    assert_eq!(updated.created_at, order.created_at);
    Ok(())
}

async fn test_update_status_missing_is_not_found(store: &dyn OrderStore) -> Result<(), StoreError> {
    let missing = uuid::Uuid::new_v4();
    assert!(matches!(
        store
            .update_status(missing, OrderStatus::Processing, None)
            .await,
        Err(StoreError::NotFound(_))
    ));
    Ok(())
}

async fn test_cancellation_reason_set_only_when_cancelled(
    store: &dyn OrderStore,
) -> Result<(), StoreError> {
    let order = store.insert(draft_for("conf-user", "cancel.pdf")).await?;

    let cancelled = store
        .update_status(
            order.id,
            OrderStatus::Cancelled,
            Some("Out of paper".to_owned()),
        )
        .await?;
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("Out of paper"));

    // A non-cancelled write must clear any stored reason.
    let order = store.insert(draft_for("conf-user", "clear.pdf")).await?;
    let processing = store
        .update_status(order.id, OrderStatus::Processing, Some("ignored".to_owned()))
        .await?;
    assert_eq!(processing.cancellation_reason, None);
    Ok(())
}

async fn test_listings_newest_first(store: &dyn OrderStore) -> Result<(), StoreError> {
    let user = format!("conf-list-{}", uuid::Uuid::new_v4());
    let first = store.insert(draft_for(&user, "one.pdf")).await?;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let second = store.insert(draft_for(&user, "two.pdf")).await?;

    let listed = store.list_by_user(&user).await?;
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id, "newest order must come first");
    assert_eq!(listed[1].id, first.id);

    let all = store.list_all().await?;
    assert!(all.len() >= 2);
    for pair in all.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at, "list_all must be newest first");
    }

    // A user with no orders gets an empty listing, not an error.
    let none = store.list_by_user("conf-nobody").await?;
    assert!(none.is_empty());
    Ok(())
}

/// Run the full subscription store conformance suite.
///
/// # Errors
///
/// Returns an error if any conformance test fails.
pub async fn run_subscription_store_conformance_tests(
    store: &dyn SubscriptionStore,
) -> Result<(), StoreError> {
    test_upsert_and_list(store).await?;
    test_upsert_replaces_by_endpoint(store).await?;
    test_invalid_subscription_rejected(store).await?;
    test_remove_is_idempotent(store).await?;
    Ok(())
}

async fn test_upsert_and_list(store: &dyn SubscriptionStore) -> Result<(), StoreError> {
    let sub = store
        .upsert("sub-user", "https://push.example/ep-1", keys("a"))
        .await?;
    assert_eq!(sub.user_id, "sub-user");
    assert_eq!(sub.endpoint, "https://push.example/ep-1");

    let listed = store.list_by_user("sub-user").await?;
    assert!(listed.iter().any(|s| s.endpoint == "https://push.example/ep-1"));

    // Never opted in: empty, not an error.
    let none = store.list_by_user("sub-nobody").await?;
    assert!(none.is_empty());
    Ok(())
}

async fn test_upsert_replaces_by_endpoint(store: &dyn SubscriptionStore) -> Result<(), StoreError> {
    let endpoint = "https://push.example/ep-replace";
    let original = store.upsert("owner-1", endpoint, keys("old")).await?;
    store.upsert("owner-2", endpoint, keys("new")).await?;

    // Exactly one row remains, owned by the latest user with the latest keys.
    let old_owner = store.list_by_user("owner-1").await?;
    assert!(!old_owner.iter().any(|s| s.endpoint == endpoint));

    let new_owner = store.list_by_user("owner-2").await?;
    let replaced: Vec<_> = new_owner.iter().filter(|s| s.endpoint == endpoint).collect();
    assert_eq!(replaced.len(), 1);
    assert_eq!(replaced[0].keys, keys("new"));

    // Replacement happens in place: the row identity and creation time
    // survive re-registration.
    assert_eq!(replaced[0].id, original.id, "upsert must keep the row id");
    assert_eq!(replaced[0].created_at, original.created_at);
    Ok(())
}

async fn test_invalid_subscription_rejected(store: &dyn SubscriptionStore) -> Result<(), StoreError> {
    assert!(matches!(
        store.upsert("u", "", keys("x")).await,
        Err(StoreError::InvalidSubscription(_))
    ));
    assert!(matches!(
        store
            .upsert(
                "u",
                "https://push.example/ep-bad",
                SubscriptionKeys {
                    p256dh: String::new(),
                    auth: "a".to_owned(),
                },
            )
            .await,
        Err(StoreError::InvalidSubscription(_))
    ));
    Ok(())
}

async fn test_remove_is_idempotent(store: &dyn SubscriptionStore) -> Result<(), StoreError> {
    let endpoint = "https://push.example/ep-remove";
    store.upsert("rm-user", endpoint, keys("rm")).await?;

    store.remove(endpoint).await?;
    let listed = store.list_by_user("rm-user").await?;
    assert!(!listed.iter().any(|s| s.endpoint == endpoint));

    // Second removal of the same endpoint, and removal of an endpoint that
    // never existed, both succeed.
    store.remove(endpoint).await?;
    store.remove("https://push.example/never-registered").await?;
    Ok(())
}
