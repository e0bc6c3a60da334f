//! Order lifecycle engine.
//!
//! The engine is the only writer of order rows. It enforces the
//! transition table defined on [`printdesk_core::OrderStatus`] and
//! sequences every status change as two strict phases: persist (awaited,
//! fallible) then notify (spawned, best-effort, outcome only logged).

mod engine;
mod error;

pub use engine::OrderEngine;
pub use error::EngineError;
