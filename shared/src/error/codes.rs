//! Unified error codes for the Brew POS
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 6xxx: Session errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Serialized as a bare `u16` so terminals can branch on it without parsing
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order already paid
    OrderAlreadyPaid = 4002,
    /// Order already cancelled
    OrderAlreadyCancelled = 4003,
    /// Order has no lines
    OrderEmpty = 4004,
    /// Transition not allowed from the current status
    InvalidTransition = 4005,
    /// Order line is malformed
    OrderLineInvalid = 4006,

    // ==================== 5xxx: Payment ====================
    /// Payment amount does not equal the order total
    PaymentAmountMismatch = 5001,
    /// Payment method is not enabled on this terminal
    PaymentMethodDisabled = 5002,
    /// Payment amount is not a positive value
    PaymentInvalidAmount = 5003,
    /// Payment not found
    PaymentNotFound = 5004,

    // ==================== 6xxx: Session ====================
    /// Session not found
    SessionNotFound = 6001,
    /// An open session already exists for the terminal and user
    SessionConflict = 6002,
    /// Session is closed
    SessionClosed = 6003,
    /// Operation requires an open session
    SessionRequired = 6004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Request timed out
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Storage is full
    StorageFull = 9006,
    /// Backend is busy, retry later
    SystemBusy = 9007,
    /// Storage is corrupted
    StorageCorrupted = 9008,
}

impl ErrorCode {
    /// Get the numeric value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Default message for this code
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",

            Self::OrderNotFound => "Order not found",
            Self::OrderAlreadyPaid => "Order already paid",
            Self::OrderAlreadyCancelled => "Order already cancelled",
            Self::OrderEmpty => "Order has no items",
            Self::InvalidTransition => "Transition not allowed",
            Self::OrderLineInvalid => "Order line is invalid",

            Self::PaymentAmountMismatch => "Payment amount does not match order total",
            Self::PaymentMethodDisabled => "Payment method is not enabled",
            Self::PaymentInvalidAmount => "Invalid payment amount",
            Self::PaymentNotFound => "Payment not found",

            Self::SessionNotFound => "Session not found",
            Self::SessionConflict => "An open session already exists",
            Self::SessionClosed => "Session is closed",
            Self::SessionRequired => "An open session is required",

            Self::InternalError => "Internal server error",
            Self::DatabaseError => "Database error",
            Self::NetworkError => "Network error",
            Self::TimeoutError => "Request timed out",
            Self::ConfigError => "Configuration error",
            Self::StorageFull => "Storage is full",
            Self::SystemBusy => "System busy, retry later",
            Self::StorageCorrupted => "Storage corrupted",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Returned when a `u16` does not name a known error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            7 => Self::RequiredField,
            8 => Self::ValueOutOfRange,

            4001 => Self::OrderNotFound,
            4002 => Self::OrderAlreadyPaid,
            4003 => Self::OrderAlreadyCancelled,
            4004 => Self::OrderEmpty,
            4005 => Self::InvalidTransition,
            4006 => Self::OrderLineInvalid,

            5001 => Self::PaymentAmountMismatch,
            5002 => Self::PaymentMethodDisabled,
            5003 => Self::PaymentInvalidAmount,
            5004 => Self::PaymentNotFound,

            6001 => Self::SessionNotFound,
            6002 => Self::SessionConflict,
            6003 => Self::SessionClosed,
            6004 => Self::SessionRequired,

            9001 => Self::InternalError,
            9002 => Self::DatabaseError,
            9003 => Self::NetworkError,
            9004 => Self::TimeoutError,
            9005 => Self::ConfigError,
            9006 => Self::StorageFull,
            9007 => Self::SystemBusy,
            9008 => Self::StorageCorrupted,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}
