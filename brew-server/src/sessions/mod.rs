//! Register session ledger
//!
//! - **storage**: redb tables sharing the order database file
//! - **ledger**: open / record / close operations and reports

mod ledger;
mod storage;

pub use ledger::SessionLedger;
pub use storage::{LedgerEntry, SessionStorage};

use crate::orders::storage::StorageError;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Terminal {terminal_id} already has open session {session_id} for user {user_id}")]
    SessionConflict {
        terminal_id: String,
        user_id: String,
        session_id: String,
    },

    #[error("Session is closed: {0}")]
    SessionClosed(String),

    #[error("Order {0} is not paid")]
    OrderNotPaid(String),

    #[error("Order {order_id} belongs to session {expected}, not {actual}")]
    SessionMismatch {
        order_id: String,
        expected: String,
        actual: String,
    },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Storage(_) => ErrorCode::DatabaseError,
            Self::SessionNotFound(_) => ErrorCode::SessionNotFound,
            Self::SessionConflict { .. } => ErrorCode::SessionConflict,
            Self::SessionClosed(_) => ErrorCode::SessionClosed,
            Self::OrderNotPaid(_) | Self::SessionMismatch { .. } => ErrorCode::ValidationFailed,
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        if let LedgerError::Storage(e) = &err {
            tracing::error!(error = %e, "Session storage error");
        }
        let code = err.code();
        let app = AppError::with_message(code, err.to_string());
        match err {
            LedgerError::SessionConflict { session_id, .. } => {
                app.with_detail("session_id", session_id)
            }
            _ => app,
        }
    }
}
