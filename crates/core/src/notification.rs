use serde::{Deserialize, Serialize};

use crate::status::OrderStatus;

/// Reason stored when staff cancel without giving one.
pub const DEFAULT_CANCELLATION_REASON: &str = "Cancelled by admin";

/// Where a tapped notification should take the user.
const DASHBOARD_URL: &str = "/dashboard";

/// Payload pushed to a subscription endpoint, serialized as
/// `{"title", "body", "url"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Relative URL the client opens when the notification is activated.
    pub url: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            url: DASHBOARD_URL.to_owned(),
        }
    }

    /// The message announcing a status change, or `None` for states that
    /// are never announced (an order never transitions back to `Pending`,
    /// and creation itself is silent — the submitter already knows).
    #[must_use]
    pub fn for_transition(target: OrderStatus, cancellation_reason: Option<&str>) -> Option<Self> {
        match target {
            OrderStatus::Pending => None,
            OrderStatus::Processing => Some(Self::new(
                "🖨️ Printing Started",
                "Your file is now being printed.",
            )),
            OrderStatus::Completed => Some(Self::new(
                "✅ Ready for Pickup!",
                "Please come to the counter to collect your documents.",
            )),
            OrderStatus::Cancelled => Some(Self::new(
                "❌ Order Cancelled",
                match cancellation_reason {
                    Some(reason) => format!("Your order was cancelled: {reason}"),
                    None => {
                        "Your order has been cancelled. Please contact the store for details."
                            .to_owned()
                    }
                },
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_message() {
        let n = Notification::for_transition(OrderStatus::Processing, None).unwrap();
        assert_eq!(n.title, "🖨️ Printing Started");
        assert_eq!(n.body, "Your file is now being printed.");
        assert_eq!(n.url, "/dashboard");
    }

    #[test]
    fn completed_message() {
        let n = Notification::for_transition(OrderStatus::Completed, None).unwrap();
        assert_eq!(n.title, "✅ Ready for Pickup!");
        assert_eq!(n.body, "Please come to the counter to collect your documents.");
    }

    #[test]
    fn cancelled_with_reason_quotes_it() {
        let n = Notification::for_transition(OrderStatus::Cancelled, Some("Out of paper")).unwrap();
        assert_eq!(n.title, "❌ Order Cancelled");
        assert!(n.body.contains("Out of paper"));
    }

    #[test]
    fn cancelled_without_reason_uses_generic_body() {
        let n = Notification::for_transition(OrderStatus::Cancelled, None).unwrap();
        assert!(n.body.contains("contact the store"));
    }

    #[test]
    fn pending_is_silent() {
        assert!(Notification::for_transition(OrderStatus::Pending, None).is_none());
    }

    #[test]
    fn wire_shape() {
        let n = Notification::new("T", "B");
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "T", "body": "B", "url": "/dashboard"})
        );
    }
}
