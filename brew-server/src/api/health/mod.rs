//! Health check
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /health | GET | Version, epoch and store sequence |

use axum::{Json, Router, extract::State, routing::get};
use shared::response::HealthResponse;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

async fn health(State(state): State<ServerState>) -> Json<HealthResponse> {
    let sequence = match state.orders.get_current_sequence() {
        Ok(seq) => Some(seq),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read the order store");
            None
        }
    };
    Json(HealthResponse {
        status: if sequence.is_some() { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        epoch: state.orders.epoch().to_string(),
        sequence,
    })
}
