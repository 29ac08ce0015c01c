//! Table API
//!
//! Table layout is owned elsewhere; the server only answers which order is
//! open on a table, for the customer-facing display.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::order::Order;

use crate::core::ServerState;
use crate::utils::AppResult;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/tables/{id}/active-order", get(active_order))
}

/// `null` when the table has no open order
async fn active_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Option<Order>>> {
    Ok(Json(state.orders.active_order_for_table(&id)?))
}
