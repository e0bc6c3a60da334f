use thiserror::Error;

/// Errors surfaced by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The referenced order id does not exist.
    #[error("order not found: {0}")]
    NotFound(uuid::Uuid),

    /// Subscription input was rejected (empty endpoint or key material).
    #[error("invalid subscription: {0}")]
    InvalidSubscription(String),

    /// The backend could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend failed the operation.
    #[error("backend error: {0}")]
    Backend(String),

    /// A row or feed payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether the error is transient and the operation may succeed on
    /// retry (connection-level failures only; logical errors never are).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
