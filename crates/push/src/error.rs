use std::time::Duration;

use thiserror::Error;

/// Errors from a single push delivery attempt.
///
/// Only [`PushError::Gone`] is permanent: the gateway has declared the
/// target dead and the dispatcher must prune the subscription. Everything
/// else may be transient and is logged and dropped — there are no
/// automatic retries; the next status transition is the only recovery.
#[derive(Debug, Error)]
pub enum PushError {
    /// The endpoint is permanently invalid (HTTP 404/410 from the
    /// gateway). The subscription must be removed.
    #[error("subscription endpoint is gone")]
    Gone,

    /// The delivery attempt did not complete within the bounded timeout.
    #[error("push delivery timed out after {0:?}")]
    Timeout(Duration),

    /// The gateway rejected the request due to rate limiting.
    #[error("push gateway rate limited")]
    RateLimited,

    /// The gateway rejected our authorization.
    #[error("push authorization rejected: {0}")]
    Auth(String),

    /// Any other transport or HTTP failure.
    #[error("push delivery failed: {0}")]
    Http(String),

    /// The payload could not be serialized.
    #[error("payload serialization failed: {0}")]
    Serialization(String),
}

impl PushError {
    /// `true` only when the target will never accept another message and
    /// the stored subscription should be pruned.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Gone)
    }
}
