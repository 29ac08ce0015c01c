//! Error category and kind classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category, derived from the code range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Order errors (4xxx)
    Order,
    /// Payment errors (5xxx)
    Payment,
    /// Session errors (6xxx)
    Session,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Order,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Session,
            _ => Self::System,
        }
    }
}

/// How the operator-facing caller should react to an error.
///
/// - `Validation`: fix the input and retry
/// - `InvalidTransition`: show a notice and refresh from authoritative state
/// - `Conflict`: someone else got there first; refresh prominently
/// - `Transient`: retry is safe (polls retry on their own, mutations do not)
/// - `SessionClosed`: stop recording against that session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    InvalidTransition,
    Conflict,
    Transient,
    SessionClosed,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Whether the caller should reload authoritative state after this error
    pub fn requires_refresh(&self) -> bool {
        matches!(self, Self::InvalidTransition | Self::Conflict | Self::NotFound)
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::ValueOutOfRange
            | Self::OrderEmpty
            | Self::OrderLineInvalid
            | Self::PaymentAmountMismatch
            | Self::PaymentMethodDisabled
            | Self::PaymentInvalidAmount
            | Self::SessionRequired => ErrorKind::Validation,

            Self::InvalidTransition => ErrorKind::InvalidTransition,

            Self::AlreadyExists
            | Self::OrderAlreadyPaid
            | Self::OrderAlreadyCancelled
            | Self::SessionConflict => ErrorKind::Conflict,

            Self::NetworkError | Self::TimeoutError | Self::SystemBusy => ErrorKind::Transient,

            Self::SessionClosed => ErrorKind::SessionClosed,

            Self::NotFound
            | Self::OrderNotFound
            | Self::PaymentNotFound
            | Self::SessionNotFound => ErrorKind::NotFound,

            Self::Success
            | Self::Unknown
            | Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::StorageFull
            | Self::StorageCorrupted => ErrorKind::Internal,
        }
    }
}
