use super::super::storage::StorageError;
use super::super::traits::OrderError;
use crate::sessions::LedgerError;
use shared::error::ErrorCode;
use shared::order::CommandError;
use thiserror::Error;

/// Manager errors
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Map a storage failure to an error code the terminal can act on
fn classify_storage_error(e: &StorageError) -> ErrorCode {
    match e {
        StorageError::Serialization(_) => return ErrorCode::InternalError,
        StorageError::OrderNotFound(_) => return ErrorCode::OrderNotFound,
        _ => {}
    }

    // redb errors are classified by message
    let err_str = e.to_string().to_lowercase();

    if err_str.contains("no space") || err_str.contains("disk full") || err_str.contains("enospc")
    {
        return ErrorCode::StorageFull;
    }

    if err_str.contains("corrupt") || err_str.contains("invalid database") {
        return ErrorCode::StorageCorrupted;
    }

    // Database/Transaction/Table/Storage/Commit errors: worth retrying
    ErrorCode::SystemBusy
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        match err {
            ManagerError::Storage(e) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = %code, "Storage error occurred");
                CommandError::new(code, e.to_string())
            }
            ManagerError::Order(e) => CommandError::new(e.code(), e.to_string()),
            ManagerError::Ledger(LedgerError::Storage(e)) => {
                let code = classify_storage_error(&e);
                tracing::error!(error = %e, error_code = %code, "Ledger storage error occurred");
                CommandError::new(code, e.to_string())
            }
            ManagerError::Ledger(e) => CommandError::new(e.code(), e.to_string()),
            ManagerError::OrderNotFound(id) => {
                CommandError::new(ErrorCode::OrderNotFound, format!("Order not found: {id}"))
            }
            ManagerError::Internal(msg) => CommandError::new(ErrorCode::InternalError, msg),
        }
    }
}

impl From<ManagerError> for shared::error::AppError {
    fn from(err: ManagerError) -> Self {
        CommandError::from(err).into()
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{InvalidTransition, OrderStatus, Transition};

    #[test]
    fn test_order_errors_keep_their_code() {
        let err = ManagerError::Order(OrderError::InvalidTransition(InvalidTransition {
            transition: Transition::Cancel,
            status: OrderStatus::Paid,
        }));
        let command_error = CommandError::from(err);
        assert_eq!(command_error.code, ErrorCode::InvalidTransition);
        assert_eq!(command_error.message, "cannot cancel an order that is paid");
    }

    #[test]
    fn test_ledger_errors_keep_their_code() {
        let err = ManagerError::Ledger(LedgerError::SessionClosed("s-1".to_string()));
        assert_eq!(CommandError::from(err).code, ErrorCode::SessionClosed);
    }

    #[test]
    fn test_serialization_error_is_internal() {
        let json_err = serde_json::from_str::<u8>("x").unwrap_err();
        let err = ManagerError::Storage(StorageError::Serialization(json_err));
        assert_eq!(CommandError::from(err).code, ErrorCode::InternalError);
    }
}
