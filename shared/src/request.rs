//! Request bodies shared by the server handlers and the terminal client

use serde::{Deserialize, Serialize};

use crate::models::PaymentRequest;
use crate::order::{CartSubmission, OrderCommand, OrderCommandPayload, Transition};

/// Who is acting, and an optional client-chosen command id.
///
/// Resending a request with the same `command_id` after a lost response is
/// answered from the first outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    pub operator_id: String,
    pub operator_name: String,
}

impl Operator {
    pub fn new(operator_id: impl Into<String>, operator_name: impl Into<String>) -> Self {
        Self {
            command_id: None,
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
        }
    }

    pub fn with_command_id(mut self, command_id: impl Into<String>) -> Self {
        self.command_id = Some(command_id.into());
        self
    }

    /// Wrap a payload, keeping the chosen command id if any
    pub fn command(self, payload: OrderCommandPayload) -> OrderCommand {
        let cmd = OrderCommand::new(self.operator_id, self.operator_name, payload);
        match self.command_id {
            Some(id) => cmd.with_command_id(id),
            None => cmd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(flatten)]
    pub operator: Operator,
    pub submission: CartSubmission,
    /// Save as a draft instead of sending to the kitchen
    #[serde(default)]
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionRequest {
    #[serde(flatten)]
    pub operator: Operator,
    pub transition: Transition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayOrderRequest {
    #[serde(flatten)]
    pub operator: Operator,
    pub payment: PaymentRequest,
}
