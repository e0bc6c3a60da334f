//! Store trait abstractions for Printdesk.
//!
//! Defines the [`OrderStore`] and [`SubscriptionStore`] contracts every
//! backend implements, the [`OrderFeed`] change-feed abstraction, and a
//! conformance test suite backends run against a fresh instance.

pub mod error;
pub mod feed;
pub mod order;
pub mod subscription;
pub mod testing;

pub use error::StoreError;
pub use feed::{OrderFeed, OrderFeedSubscription};
pub use order::OrderStore;
pub use subscription::SubscriptionStore;
