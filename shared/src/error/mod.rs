//! Unified error system
//!
//! - [`ErrorCode`]: numeric codes shared by server and terminals
//! - [`ErrorCategory`]: grouping by code range
//! - [`ErrorKind`]: how a caller should react (validate, refresh, retry...)
//! - [`AppError`]: code + message + optional details
//! - [`ErrorBody`]: JSON body of a failed request
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Session errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode, ErrorKind};
//!
//! let err = AppError::with_message(ErrorCode::PaymentAmountMismatch, "expected 100.00")
//!     .with_detail("order_id", "o-1");
//! assert_eq!(err.kind(), ErrorKind::Validation);
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, 5001);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::{ErrorCategory, ErrorKind};
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
