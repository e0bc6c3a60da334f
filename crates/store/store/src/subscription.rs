use async_trait::async_trait;

use printdesk_core::{PushSubscription, SubscriptionKeys};

use crate::error::StoreError;

/// Durable mapping from a user identity to zero or more push endpoints.
///
/// No caching layer sits in front of this trait: the registry is small and
/// read before every send, so reads always reflect durable storage at call
/// time. Two writers exist — subscription registration and the
/// dispatcher's cleanup of dead endpoints — and both conflict on
/// `endpoint`, so concurrent upserts and removals for the same endpoint
/// are idempotent and order-independent.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Insert or replace the subscription keyed by `endpoint`.
    ///
    /// Re-registering an existing endpoint replaces its key material and
    /// owner rather than duplicating the row. Returns
    /// [`StoreError::InvalidSubscription`] if the endpoint or either key
    /// field is empty.
    async fn upsert(
        &self,
        user_id: &str,
        endpoint: &str,
        keys: SubscriptionKeys,
    ) -> Result<PushSubscription, StoreError>;

    /// All subscriptions owned by `user_id`, unordered. May be empty —
    /// most users never opt in.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<PushSubscription>, StoreError>;

    /// Delete the subscription with the given endpoint. Idempotent:
    /// removing an unknown endpoint succeeds.
    async fn remove(&self, endpoint: &str) -> Result<(), StoreError>;
}

/// Validate subscription input. Backends call this at the top of
/// [`SubscriptionStore::upsert`] so every implementation rejects the same
/// shapes.
pub fn check_subscription_input(
    endpoint: &str,
    keys: &SubscriptionKeys,
) -> Result<(), StoreError> {
    if endpoint.trim().is_empty() {
        return Err(StoreError::InvalidSubscription("empty endpoint".into()));
    }
    if !keys.is_complete() {
        return Err(StoreError::InvalidSubscription(
            "incomplete key material".into(),
        ));
    }
    Ok(())
}
