//! Utilities
//!
//! - [`AppError`] / [`AppResult`]: handler errors (from `shared::error`)
//! - [`logger`]: tracing setup

pub mod logger;

pub use shared::error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
