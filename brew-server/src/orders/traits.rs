//! Command handler and event applier seams
//!
//! Actions turn a command into events without touching storage directly: they
//! read through [`CommandContext`] and return events. Appliers fold one event
//! into an order snapshot and must stay pure, so replaying the event stream
//! rebuilds the same snapshot.

use async_trait::async_trait;
use enum_dispatch::enum_dispatch;
use redb::WriteTransaction;
use shared::error::ErrorCode;
use shared::models::Session;
use shared::order::{InvalidTransition, Order, OrderEvent, SubmissionError};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[allow(unused_imports)]
use super::appliers::{
    DraftDeletedApplier, EventAction, OrderCreatedApplier, PaymentSettledApplier,
    StatusChangedApplier,
};
use super::storage::{OrderStorage, StorageError};
use crate::sessions::SessionStorage;

/// Domain errors raised while executing a command
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already paid: {0}")]
    OrderAlreadyPaid(String),

    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),

    #[error(transparent)]
    InvalidSubmission(#[from] SubmissionError),

    #[error("Payment amount {paid} does not match order total {total}")]
    AmountMismatch {
        paid: rust_decimal::Decimal,
        total: rust_decimal::Decimal,
    },

    #[error("Invalid payment amount: {0}")]
    InvalidAmount(rust_decimal::Decimal),

    #[error("Payment method not enabled: {0}")]
    MethodDisabled(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session is closed: {0}")]
    SessionClosed(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl OrderError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OrderNotFound(_) => ErrorCode::OrderNotFound,
            Self::OrderAlreadyPaid(_) => ErrorCode::OrderAlreadyPaid,
            Self::InvalidTransition(_) => ErrorCode::InvalidTransition,
            Self::InvalidSubmission(e) => e.code(),
            Self::AmountMismatch { .. } => ErrorCode::PaymentAmountMismatch,
            Self::InvalidAmount(_) => ErrorCode::PaymentInvalidAmount,
            Self::MethodDisabled(_) => ErrorCode::PaymentMethodDisabled,
            Self::SessionNotFound(_) => ErrorCode::SessionNotFound,
            Self::SessionClosed(_) => ErrorCode::SessionClosed,
            Self::InvalidOperation(_) => ErrorCode::InvalidRequest,
            Self::Storage(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<StorageError> for OrderError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::OrderNotFound(id) => Self::OrderNotFound(id),
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Who issued a command and when
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
}

/// Transaction-scoped view used by actions.
///
/// Snapshots saved here shadow the stored ones until the manager persists
/// them, so several events in one command see each other's effects.
pub struct CommandContext<'a> {
    txn: &'a WriteTransaction,
    storage: &'a OrderStorage,
    sessions: &'a SessionStorage,
    sequence: u64,
    modified: HashMap<String, Order>,
    removed: HashSet<String>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        txn: &'a WriteTransaction,
        storage: &'a OrderStorage,
        sessions: &'a SessionStorage,
        current_sequence: u64,
    ) -> Self {
        Self {
            txn,
            storage,
            sessions,
            sequence: current_sequence,
            modified: HashMap::new(),
            removed: HashSet::new(),
        }
    }

    /// Allocate the next global sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    /// Load an order, preferring the in-flight copy
    pub fn load_order(&self, order_id: &str) -> Result<Order, OrderError> {
        if self.removed.contains(order_id) {
            return Err(OrderError::OrderNotFound(order_id.to_string()));
        }
        if let Some(order) = self.modified.get(order_id) {
            return Ok(order.clone());
        }
        self.storage
            .get_order_txn(self.txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    pub fn save_order(&mut self, order: Order) {
        self.removed.remove(&order.order_id);
        self.modified.insert(order.order_id.clone(), order);
    }

    pub fn remove_order(&mut self, order_id: &str) {
        self.modified.remove(order_id);
        self.removed.insert(order_id.to_string());
    }

    pub fn load_session(&self, session_id: &str) -> Result<Session, OrderError> {
        self.sessions
            .get_session_txn(self.txn, session_id)
            .map_err(|e| OrderError::Storage(e.to_string()))?
            .ok_or_else(|| OrderError::SessionNotFound(session_id.to_string()))
    }

    pub fn modified_orders(&self) -> impl Iterator<Item = &Order> {
        self.modified.values()
    }

    pub fn removed_orders(&self) -> impl Iterator<Item = &String> {
        self.removed.iter()
    }
}

/// Turns a command into events
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Folds one event into an order snapshot
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent);
}
