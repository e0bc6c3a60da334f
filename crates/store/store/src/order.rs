use async_trait::async_trait;
use uuid::Uuid;

use printdesk_core::{Order, OrderStatus, ValidOrderDraft};

use crate::error::StoreError;

/// Durable storage for order rows.
///
/// This trait is the sole write path for orders; the lifecycle engine is
/// its only writer. Every write is a single atomic row mutation — no
/// multi-row transactions are required.
///
/// Implementations must be `Send + Sync` and safe for concurrent access.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist a new order. Assigns the id and timestamps and stores it
    /// with status [`OrderStatus::Pending`]. Returns the persisted row.
    async fn insert(&self, draft: ValidOrderDraft) -> Result<Order, StoreError>;

    /// Set the status of an existing order and bump `updated_at` in the
    /// same write.
    ///
    /// `cancellation_reason` is stored when `status` is
    /// [`OrderStatus::Cancelled`] and cleared otherwise, preserving the
    /// invariant that a reason exists exactly on cancelled rows.
    ///
    /// Returns [`StoreError::NotFound`] if the id is unknown. Does not
    /// check transition legality — that is the engine's job.
    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        cancellation_reason: Option<String>,
    ) -> Result<Order, StoreError>;

    /// Fetch one order by id.
    async fn get(&self, id: Uuid) -> Result<Order, StoreError>;

    /// All orders owned by `user_id`, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Order>, StoreError>;

    /// Every order, newest first. Administrative view.
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;
}
