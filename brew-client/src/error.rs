//! Client error types
//!
//! Server rejections keep their [`ErrorCode`], so callers branch on
//! [`ClientError::kind`] instead of parsing messages.

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode, ErrorKind};
use shared::order::{InvalidTransition, SubmissionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connect, timeout, body)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the request
    #[error("{message} ({code})")]
    Api {
        code: ErrorCode,
        message: String,
        details: Option<HashMap<String, serde_json::Value>>,
    },

    /// No answer within the poll or request deadline
    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Another action on the same entity has not returned yet
    #[error("An action on {0} is still in flight")]
    Busy(String),

    #[error(transparent)]
    Cart(#[from] SubmissionError),

    /// Rejected locally, before reaching the server
    #[error(transparent)]
    Transition(#[from] InvalidTransition),

    #[error("No open session on this terminal")]
    NoSession,
}

impl ClientError {
    /// How the operator should be told
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_decode() => ErrorKind::Internal,
            Self::Http(_) | Self::Timeout(_) => ErrorKind::Transient,
            Self::Api { code, .. } => code.kind(),
            Self::InvalidResponse(_) | Self::Serialization(_) => ErrorKind::Internal,
            Self::Busy(_) => ErrorKind::Transient,
            Self::Cart(_) | Self::NoSession => ErrorKind::Validation,
            Self::Transition(_) => ErrorKind::InvalidTransition,
        }
    }

    /// Server error code, if the server answered
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the outcome on the server is unknown
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

impl From<AppError> for ClientError {
    fn from(err: AppError) -> Self {
        Self::Api {
            code: err.code,
            message: err.message,
            details: err.details,
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
