//! In-memory store backend.
//!
//! Backs every unit test in the workspace and single-node development
//! runs. Rows live in [`DashMap`]s; the change feed is a broadcast channel
//! published synchronously with each mutation, so feed consumers observe
//! writes in commit order.

mod store;

pub use store::MemoryStore;
