use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod events;
pub mod health;
pub mod notifications;
pub mod orders;

/// Build the full API router over the given handles.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route(
            "/api/orders",
            post(orders::create).get(orders::list_for_user),
        )
        .route("/api/admin/orders", get(orders::list_all))
        .route("/api/admin/orders/{id}/status", post(orders::update_status))
        .route("/api/admin/orders/{id}/cancel", post(orders::cancel))
        .route("/api/notifications/subscribe", post(notifications::subscribe))
        .route(
            "/api/notifications/unsubscribe",
            post(notifications::unsubscribe),
        )
        .route("/api/events", get(events::stream))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
