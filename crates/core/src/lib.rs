//! Core domain types shared across the Printdesk workspace.
//!
//! This crate defines the order and push-subscription row shapes, the order
//! lifecycle state machine, the notification payload, and the change-feed
//! event type. It deliberately contains no I/O: storage backends, push
//! delivery, and the HTTP surface all live in sibling crates and depend on
//! the contracts defined here.

pub mod error;
pub mod event;
pub mod notification;
pub mod order;
pub mod status;
pub mod subscription;

pub use error::ValidationError;
pub use event::{OrderEvent, OrderEventKind};
pub use notification::Notification;
pub use order::{ColorMode, Order, OrderDraft, PrintSides, ValidOrderDraft};
pub use status::OrderStatus;
pub use subscription::{PushSubscription, SubscriptionKeys};
