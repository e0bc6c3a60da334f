//! Push delivery for Printdesk.
//!
//! [`PushGateway`] is the seam between the notification dispatcher and the
//! external push infrastructure. [`HttpPushGateway`] delivers over HTTP to
//! the subscription endpoint with optional VAPID authorization;
//! [`MockPushGateway`] records sends for tests across the workspace.

mod error;
mod gateway;
mod http;
mod mock;
mod vapid;

pub use error::PushError;
pub use gateway::PushGateway;
pub use http::{HttpPushConfig, HttpPushGateway};
pub use mock::{MockPushGateway, SentPush};
pub use vapid::VapidConfig;
