use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cryptographic material the push gateway needs to encrypt a message to
/// one delivery target. Opaque to this core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

impl SubscriptionKeys {
    /// Whether both key fields are present and non-empty.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.p256dh.trim().is_empty() && !self.auth.trim().is_empty()
    }
}

/// One push delivery target owned by a user.
///
/// A user may hold many subscriptions (one per browser/device). The
/// `endpoint` is globally unique and acts as the natural key: registering
/// the same endpoint again replaces the stored keys and owner instead of
/// adding a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub id: Uuid,
    pub user_id: String,
    /// Delivery-target URL the push gateway routes on.
    pub endpoint: String,
    #[serde(flatten)]
    pub keys: SubscriptionKeys,
    pub created_at: DateTime<Utc>,
}
