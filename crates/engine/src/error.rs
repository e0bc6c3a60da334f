use thiserror::Error;
use uuid::Uuid;

use printdesk_core::{OrderStatus, ValidationError};
use printdesk_store::StoreError;

/// Errors on the engine's write path.
///
/// Everything here aborts the triggering call before any notification is
/// attempted. Notify-path failures never appear in this type — they are
/// logged on the spawned task and isolated from the caller by design.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input validation failed; nothing was persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    NotFound(Uuid),

    /// The requested status is not reachable from the current one.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// The durable store failed. Fatal to the triggering call.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}
