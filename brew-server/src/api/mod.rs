//! HTTP API
//!
//! - [`health`] - liveness and store check
//! - [`orders`] - order commands, lookups, payments
//! - [`kitchen`] - kitchen queue, stage counts, event stream
//! - [`sessions`] - register session open/close and summaries
//! - [`payments`] - enabled payment methods
//! - [`tables`] - active order per table
//!
//! Handlers return the raw JSON body on success; failures render as the
//! shared [`ErrorBody`](shared::error::ErrorBody).

pub mod health;
pub mod kitchen;
pub mod orders;
pub mod payments;
pub mod sessions;
pub mod tables;

use axum::Router;

use crate::core::ServerState;
pub use crate::utils::{AppError, AppResult};

/// All routes, without middleware
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(kitchen::router())
        .merge(sessions::router())
        .merge(payments::router())
        .merge(tables::router())
}
