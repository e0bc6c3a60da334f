//! PostgreSQL store backend.
//!
//! Orders and push subscriptions live in two tables created by idempotent
//! migrations. The change feed piggybacks on `LISTEN/NOTIFY`: a trigger on
//! the orders table emits each row mutation as JSON, and a listener task
//! forwards those payloads into the broadcast channel that backs
//! [`printdesk_store::OrderFeedSubscription`].

mod config;
mod feed;
mod migrations;
mod store;

pub use config::PostgresConfig;
pub use feed::PostgresOrderFeed;
pub use store::PostgresStore;
