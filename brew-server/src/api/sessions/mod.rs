//! Register session API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/sessions", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::history).post(handler::open))
        .route("/active", get(handler::active))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/close", post(handler::close))
        .route("/{id}/summary", get(handler::summary))
}
