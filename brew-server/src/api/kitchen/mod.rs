//! Kitchen display API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /api/kitchen/orders | GET | Queue, optionally `?stage=to_cook` |
//! | /api/kitchen/stats | GET | Order count per stage |
//! | /api/kitchen/events | GET | Server-sent order events |
//!
//! The event stream only shortens the time to the next refresh. Displays
//! still poll the queue, so a dropped stream never loses state.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::stream::{self, Stream};
use serde::Deserialize;
use shared::order::{KitchenStage, KitchenStats, Order, OrderEvent};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().nest(
        "/api/kitchen",
        Router::new()
            .route("/orders", get(queue))
            .route("/stats", get(stats))
            .route("/events", get(events)),
    )
}

#[derive(Debug, Deserialize)]
pub struct QueueQuery {
    #[serde(default)]
    pub stage: Option<KitchenStage>,
}

async fn queue(
    State(state): State<ServerState>,
    Query(query): Query<QueueQuery>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.orders.kitchen_queue(query.stage)?))
}

async fn stats(State(state): State<ServerState>) -> AppResult<Json<KitchenStats>> {
    Ok(Json(state.orders.kitchen_stats()?))
}

async fn events(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!("Kitchen event stream opened");
    Sse::new(kitchen_stream(state.orders.subscribe()))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Kitchen-relevant events as SSE frames; a lagging reader gets a `resync` frame
fn kitchen_stream(
    rx: broadcast::Receiver<OrderEvent>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.is_kitchen_relevant() => {
                    let frame = match Event::default()
                        .event("order")
                        .id(event.sequence.to_string())
                        .json_data(&event)
                    {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to encode kitchen event");
                            continue;
                        }
                    };
                    return Some((Ok(frame), rx));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Kitchen event stream lagged");
                    let frame = Event::default().event("resync").data(skipped.to_string());
                    return Some((Ok(frame), rx));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use shared::order::{EventPayload, KitchenStage, OrderStatus, Transition};

    fn status_event(sequence: u64) -> OrderEvent {
        OrderEvent::new(
            sequence,
            "o-1".to_string(),
            "u-1".to_string(),
            "Asha".to_string(),
            "cmd".to_string(),
            None,
            EventPayload::StatusChanged {
                transition: Transition::BeginPreparing,
                from: OrderStatus::SentToKitchen,
                to: OrderStatus::Preparing,
                kitchen_stage: Some(KitchenStage::Preparing),
                reason: None,
            },
        )
    }

    #[tokio::test]
    async fn test_stream_forwards_events_and_ends_on_close() {
        let (tx, rx) = broadcast::channel(8);
        let stream = kitchen_stream(rx);
        tx.send(status_event(1)).unwrap();
        tx.send(status_event(2)).unwrap();
        drop(tx);

        let frames: Vec<_> = stream.collect().await;
        assert_eq!(frames.len(), 2);
    }

    #[tokio::test]
    async fn test_lagged_reader_gets_resync() {
        let (tx, rx) = broadcast::channel(1);
        let stream = kitchen_stream(rx);
        tx.send(status_event(1)).unwrap();
        tx.send(status_event(2)).unwrap();
        drop(tx);

        // resync frame, then the one retained event
        let frames: Vec<_> = stream.collect().await;
        assert_eq!(frames.len(), 2);
    }
}
