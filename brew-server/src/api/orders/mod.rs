//! Order API
//!
//! Every mutation is an [`OrderCommand`](shared::order::OrderCommand) run by
//! the OrdersManager. Clients may pass their own `command_id` and resend it
//! after a lost response; the replay is answered without re-applying.

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/commands", post(handler::execute))
        .route("/events", get(handler::events_since))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete_draft))
        .route("/{id}/transition", post(handler::transition))
        .route("/{id}/events", get(handler::events))
        .route("/{id}/payments", get(handler::payments))
        .route("/{id}/pay", post(handler::pay))
        .route("/{id}/upi-link", get(handler::upi_link))
}
