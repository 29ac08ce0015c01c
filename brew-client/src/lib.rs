//! Terminal-side client for the brew server
//!
//! - [`HttpBackend`]: typed access to the server's HTTP API
//! - [`Register`]: cart submission, payment and session workflow
//! - [`sync`]: polled order views and optimistic kitchen actions

pub mod backend;
pub mod config;
pub mod error;
pub mod http;
pub mod register;
pub mod sync;

pub use backend::OrderBackend;
pub use config::{ClientConfig, PollIntervals};
pub use error::{ClientError, ClientResult};
pub use http::HttpBackend;
pub use register::Register;
pub use sync::{KitchenSync, OrderView, Poller};

// Re-export shared types for convenience
pub use shared::error::{ErrorCode, ErrorKind};
