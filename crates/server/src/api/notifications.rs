use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use printdesk_core::SubscriptionKeys;

use crate::error::ServerError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SubscriptionPayload {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Deserialize)]
pub struct SubscribeRequest {
    pub user_id: String,
    pub subscription: SubscriptionPayload,
}

/// `POST /api/notifications/subscribe` — register or replace a push
/// delivery target. Conflict key is the endpoint, so re-registering from
/// the same browser replaces the row.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> Result<StatusCode, ServerError> {
    state
        .subscriptions
        .upsert(
            &request.user_id,
            &request.subscription.endpoint,
            request.subscription.keys,
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// `POST /api/notifications/unsubscribe` — idempotent removal.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(request): Json<UnsubscribeRequest>,
) -> Result<StatusCode, ServerError> {
    state.subscriptions.remove(&request.endpoint).await?;
    Ok(StatusCode::NO_CONTENT)
}
