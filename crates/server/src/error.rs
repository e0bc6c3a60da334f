use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use printdesk_engine::EngineError;
use printdesk_store::StoreError;

/// Errors surfaced through the HTTP API.
///
/// Only write-path failures reach this type. Push delivery failures are
/// settled on a background task and never appear in a response — the
/// order state is already correct by the time delivery is attempted.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An engine-level error surfaced through the API.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A store-level error from a read path the engine does not mediate.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Engine(EngineError::Validation(e)) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::Engine(EngineError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("order not found: {id}"))
            }
            Self::Engine(e @ EngineError::InvalidTransition { .. }) => {
                (StatusCode::CONFLICT, e.to_string())
            }
            Self::Store(StoreError::InvalidSubscription(msg)) => {
                (StatusCode::BAD_REQUEST, format!("invalid subscription: {msg}"))
            }
            Self::Store(StoreError::NotFound(id)) => {
                (StatusCode::NOT_FOUND, format!("order not found: {id}"))
            }
            Self::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            Self::Engine(EngineError::Store(e)) | Self::Store(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
