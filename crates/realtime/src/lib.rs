//! Realtime fan-out for open order views.
//!
//! The [`OrderFeedBridge`] consumes the order change feed and keeps every
//! open view consistent with the store: each event invalidates the cached
//! listings (admin and per-user) and is forwarded to the view layer as a
//! [`BridgeEvent`]. The bridge is observer-only — it never writes an
//! order — and is deliberately redundant with a periodic poll that
//! invalidates the same caches in case the feed connection drops
//! silently. Both paths are read-only over the same store and converge.

mod bridge;
mod cache;

pub use bridge::{BridgeEvent, BridgeHandle, BridgeOptions, OrderFeedBridge};
pub use cache::ListingCache;
