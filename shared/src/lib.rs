//! Shared types for the Brew café POS
//!
//! Domain types and pure logic used by both the server and the terminals:
//! money arithmetic, error codes, the register cart, the order state machine,
//! and the session / payment models.

pub mod cart;
pub mod error;
pub mod models;
pub mod money;
pub mod order;
pub mod request;
pub mod response;
pub mod util;

// Re-exports
pub use axum::Json;
pub use http;
pub use serde::{Deserialize, Serialize};
