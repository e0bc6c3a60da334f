use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use printdesk_core::{Order, OrderDraft, OrderStatus};

use crate::error::ServerError;
use crate::state::AppState;

/// `POST /api/orders` — submit a print job.
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<OrderDraft>,
) -> Result<(StatusCode, Json<Order>), ServerError> {
    let order = state.engine.create(draft).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub user_id: String,
}

/// `GET /api/orders?user_id=` — the caller's orders, newest first.
///
/// Served through the listing cache; the bridge invalidates it on every
/// observed write.
pub async fn list_for_user(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Order>>, ServerError> {
    let orders = state.listings.user_orders(&query.user_id).await?;
    Ok(Json(orders))
}

/// `GET /api/admin/orders` — every order, newest first.
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Order>>, ServerError> {
    let orders = state.listings.admin_orders().await?;
    Ok(Json(orders))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// `POST /api/admin/orders/{id}/status` — advance an order.
///
/// The owner is notified on a background task; this response only
/// reflects the state change itself.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ServerError> {
    let order = state.engine.transition(id, request.status, None).await?;
    Ok(Json(order))
}

#[derive(Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// `POST /api/admin/orders/{id}/cancel` — cancel with an optional reason.
pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<Order>, ServerError> {
    let order = state
        .engine
        .transition(id, OrderStatus::Cancelled, request.reason)
        .await?;
    Ok(Json(order))
}
