use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a print order.
///
/// The transition graph is one-directional: an order starts at `Pending`
/// and ends in one of the terminal states. [`can_transition_to`] is the
/// single source of truth for which moves are legal; every writer must
/// consult it before persisting a status change.
///
/// [`can_transition_to`]: OrderStatus::can_transition_to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Submitted, not yet picked up by staff.
    Pending,
    /// Staff started printing.
    Processing,
    /// Printed and ready for pickup. Terminal.
    Completed,
    /// Cancelled by staff. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether a transition from `self` to `target` is legal.
    ///
    /// Total over all state pairs:
    /// - `Pending` → `Processing` | `Cancelled`
    /// - `Processing` → `Completed` | `Cancelled`
    /// - `Completed`, `Cancelled` → nothing
    ///
    /// Self-transitions are not legal; repeating a status change is a
    /// caller bug, not an idempotent no-op.
    #[must_use]
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Completed | Self::Cancelled)
        )
    }

    /// Whether this state has no outgoing transitions.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Stable lowercase name, matching the serde representation and the
    /// column value stored by the backends.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// All states, for exhaustive table tests.
    pub const ALL: [OrderStatus; 4] = [
        Self::Pending,
        Self::Processing,
        Self::Completed,
        Self::Cancelled,
    ];
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = crate::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(crate::ValidationError::UnknownStatus(other.to_owned())),
        }
    }
}
