//! Payment method API

use axum::{Json, Router, extract::State, routing::get};

use crate::core::ServerState;
use shared::response::PaymentMethods;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/payments/methods", get(methods))
}

async fn methods(State(state): State<ServerState>) -> Json<PaymentMethods> {
    Json(state.payments.enabled_methods())
}
