//! HTTP surface for Printdesk.
//!
//! Wires the store, engine, dispatcher, and change feed into an axum
//! router. Every handle is constructed explicitly at startup and passed
//! in through [`AppState`] — no module-level singletons, so tests build
//! the whole stack over the in-memory backend.

pub mod api;
pub mod config;
pub mod error;
pub mod state;

pub use config::ServerConfig;
pub use error::ServerError;
pub use state::AppState;
