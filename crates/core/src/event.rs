use serde::{Deserialize, Serialize};

use crate::order::Order;

/// Kind of row mutation observed on the order table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderEventKind {
    Inserted,
    Updated,
    Deleted,
}

/// One change-feed item, scoped to the order table.
///
/// `order` is the row after the mutation (for a delete, the row as it was).
/// `previous` carries the pre-image on updates when the feed source
/// provides one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub kind: OrderEventKind,
    pub order: Order,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Box<Order>>,
}

impl OrderEvent {
    pub fn inserted(order: Order) -> Self {
        Self {
            kind: OrderEventKind::Inserted,
            order,
            previous: None,
        }
    }

    pub fn updated(order: Order, previous: Option<Order>) -> Self {
        Self {
            kind: OrderEventKind::Updated,
            order,
            previous: previous.map(Box::new),
        }
    }

    pub fn deleted(order: Order) -> Self {
        Self {
            kind: OrderEventKind::Deleted,
            order,
            previous: None,
        }
    }
}
