//! Best-effort push notification dispatch.
//!
//! The [`Dispatcher`] fans one message out to every push endpoint a user
//! has registered. Delivery is inherently best-effort over an untrusted
//! transport, so the dispatcher is infallible by construction: endpoints
//! fail independently, dead endpoints are pruned from the registry as a
//! cleanup side effect, and completion never implies anyone actually
//! received the message.

mod dispatcher;
mod report;

pub use dispatcher::Dispatcher;
pub use report::{DeliveryOutcome, DeliveryReport};
