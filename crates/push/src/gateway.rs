use async_trait::async_trait;

use printdesk_core::{Notification, PushSubscription};

use crate::error::PushError;

/// A delivery channel that accepts a payload addressed to one
/// subscription endpoint.
///
/// Object-safe so the dispatcher can hold `Arc<dyn PushGateway>` and
/// tests can swap in [`crate::MockPushGateway`]. Implementations must
/// bound each attempt with a timeout: a hung endpoint must never stall
/// the order transition that triggered the send.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Attempt delivery of `notification` to `subscription`'s endpoint.
    ///
    /// Distinguishes the permanently-gone condition via
    /// [`PushError::Gone`]; every other failure is potentially transient.
    async fn send(
        &self,
        subscription: &PushSubscription,
        notification: &Notification,
    ) -> Result<(), PushError>;
}
