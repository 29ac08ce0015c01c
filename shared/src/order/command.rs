//! Order commands - requests from terminals to change orders
//!
//! Every command carries a `command_id`. The server records processed ids, so
//! re-sending a command after a lost response never applies it twice.

use super::types::{CartSubmission, Transition};
use crate::models::PaymentRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderCommand {
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(
        operator_id: impl Into<String>,
        operator_name: impl Into<String>,
        payload: OrderCommandPayload,
    ) -> Self {
        Self {
            command_id: crate::util::new_id(),
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
            timestamp: crate::util::now_millis(),
            payload,
        }
    }

    /// Reuse a client-chosen id (retries must send the same id)
    pub fn with_command_id(mut self, command_id: impl Into<String>) -> Self {
        self.command_id = command_id.into();
        self
    }

    /// Order targeted by the command, if it already exists
    pub fn order_id(&self) -> Option<&str> {
        match &self.payload {
            OrderCommandPayload::PlaceOrder { .. } | OrderCommandPayload::SaveDraft { .. } => None,
            OrderCommandPayload::Transition { order_id, .. }
            | OrderCommandPayload::DeleteDraft { order_id }
            | OrderCommandPayload::SettlePayment { order_id, .. } => Some(order_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// Create the order and send it to the kitchen in one step
    PlaceOrder { submission: CartSubmission },
    /// Create a draft that stays out of the kitchen
    SaveDraft { submission: CartSubmission },
    /// Kitchen advance or cancel
    Transition {
        order_id: String,
        transition: Transition,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Hard-delete a draft
    DeleteDraft { order_id: String },
    /// Record payment, mark paid, update the session ledger
    SettlePayment {
        order_id: String,
        payment: PaymentRequest,
    },
}
