use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tracing::warn;

use crate::error::ServerError;
use crate::state::AppState;

/// `GET /api/events` — the order change feed as Server-Sent Events.
///
/// This is the browser-facing transport of the realtime fan-out: each
/// feed item becomes one SSE message whose event name is the mutation
/// kind and whose data is the full `OrderEvent` JSON. Clients re-fetch
/// their listings on receipt; a dropped connection falls back to the
/// same polling the bridge uses.
pub async fn stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    let subscription = state.feed.subscribe().await?;

    let stream = futures::stream::unfold(subscription, |mut subscription| async move {
        let order_event = subscription.recv().await?;
        let kind = match order_event.kind {
            printdesk_core::OrderEventKind::Inserted => "order_inserted",
            printdesk_core::OrderEventKind::Updated => "order_updated",
            printdesk_core::OrderEventKind::Deleted => "order_deleted",
        };
        let event = match Event::default().event(kind).json_data(&order_event) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "failed to serialize feed event for SSE");
                Event::default().comment("serialization failure")
            }
        };
        Some((Ok(event), subscription))
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
