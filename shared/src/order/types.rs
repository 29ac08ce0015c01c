//! Order value types shared by commands, events and snapshots

use crate::error::ErrorCode;
use crate::money::{MAX_PRICE, MAX_QUANTITY};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Draft,
    SentToKitchen,
    Preparing,
    Completed,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::SentToKitchen => "sent_to_kitchen",
            Self::Preparing => "preparing",
            Self::Completed => "completed",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// `paid` and `cancelled` accept no further transitions
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Position along the lifecycle; never decreases for a given order
    pub const fn progress_rank(&self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::SentToKitchen => 1,
            Self::Preparing => 2,
            Self::Completed => 3,
            Self::Paid | Self::Cancelled => 4,
        }
    }

    /// Statuses the kitchen display works from
    pub const fn is_in_kitchen(&self) -> bool {
        matches!(self, Self::SentToKitchen | Self::Preparing | Self::Completed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Food preparation progress, set once an order reaches the kitchen
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KitchenStage {
    ToCook,
    Preparing,
    Completed,
}

impl KitchenStage {
    pub const ALL: [KitchenStage; 3] = [Self::ToCook, Self::Preparing, Self::Completed];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ToCook => "to_cook",
            Self::Preparing => "preparing",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for KitchenStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle transition requested by an operator or by settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    SendToKitchen,
    BeginPreparing,
    MarkReady,
    SettlePayment,
    Cancel,
}

impl Transition {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SendToKitchen => "send_to_kitchen",
            Self::BeginPreparing => "begin_preparing",
            Self::MarkReady => "mark_ready",
            Self::SettlePayment => "settle_payment",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a submitted cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

/// Cart contents sent to the backend to create an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSubmission {
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub lines: Vec<SubmittedLine>,
}

/// Rejected cart submission
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("cart is empty")]
    Empty,
    #[error("line {index} is invalid: {reason}")]
    InvalidLine { index: usize, reason: String },
}

impl SubmissionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Empty => ErrorCode::OrderEmpty,
            Self::InvalidLine { .. } => ErrorCode::OrderLineInvalid,
        }
    }
}

impl CartSubmission {
    /// Check shape before an order is created from this submission
    pub fn validate(&self) -> Result<(), SubmissionError> {
        if self.lines.is_empty() {
            return Err(SubmissionError::Empty);
        }
        for (index, line) in self.lines.iter().enumerate() {
            let reason = if line.quantity <= 0 {
                Some(format!("quantity must be positive, got {}", line.quantity))
            } else if line.quantity > MAX_QUANTITY {
                Some(format!("quantity exceeds {MAX_QUANTITY}"))
            } else if line.unit_price.is_sign_negative() {
                Some(format!("unit price must be non-negative, got {}", line.unit_price))
            } else if line.unit_price > MAX_PRICE {
                Some(format!("unit price exceeds {MAX_PRICE}"))
            } else if line.discount_percent < Decimal::ZERO
                || line.discount_percent > Decimal::ONE_HUNDRED
            {
                Some(format!("discount must be within 0-100, got {}", line.discount_percent))
            } else if line.tax_percent.is_sign_negative() {
                Some(format!("tax must be non-negative, got {}", line.tax_percent))
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(SubmissionError::InvalidLine { index, reason });
            }
        }
        Ok(())
    }
}

/// Filters for order listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitchen_stage: Option<KitchenStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
}

/// Per-stage counts for the kitchen display header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitchenStats {
    pub to_cook: u32,
    pub preparing: u32,
    pub completed: u32,
}

impl KitchenStats {
    pub fn count(&mut self, stage: KitchenStage) {
        match stage {
            KitchenStage::ToCook => self.to_cook += 1,
            KitchenStage::Preparing => self.preparing += 1,
            KitchenStage::Completed => self.completed += 1,
        }
    }
}

/// Command response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    pub success: bool,
    /// Order the command created or touched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Set when this command id was already processed
    #[serde(default)]
    pub duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            duplicate: false,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            duplicate: false,
            error: Some(error),
        }
    }

    pub fn duplicate(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            duplicate: true,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<CommandError> for crate::error::AppError {
    fn from(err: CommandError) -> Self {
        crate::error::AppError::with_message(err.code, err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, price: i64) -> SubmittedLine {
        SubmittedLine {
            product_id: "p-1".to_string(),
            name: "Latte".to_string(),
            quantity,
            unit_price: Decimal::new(price, 2),
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::new(5, 0),
            note: String::new(),
        }
    }

    fn submission(lines: Vec<SubmittedLine>) -> CartSubmission {
        CartSubmission {
            session_id: "s-1".to_string(),
            table_id: None,
            table_name: None,
            customer_id: None,
            customer_name: None,
            note: None,
            lines,
        }
    }

    #[test]
    fn test_validate_rejects_empty() {
        let err = submission(vec![]).validate().unwrap_err();
        assert_eq!(err, SubmissionError::Empty);
        assert_eq!(err.code(), ErrorCode::OrderEmpty);
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        let err = submission(vec![line(1, 100), line(0, 100)])
            .validate()
            .unwrap_err();
        assert!(matches!(err, SubmissionError::InvalidLine { index: 1, .. }));
        assert_eq!(err.code(), ErrorCode::OrderLineInvalid);
    }

    #[test]
    fn test_validate_accepts_well_formed() {
        assert!(submission(vec![line(2, 350)]).validate().is_ok());
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::SentToKitchen).unwrap(),
            "\"sent_to_kitchen\""
        );
        assert_eq!(
            serde_json::from_str::<KitchenStage>("\"to_cook\"").unwrap(),
            KitchenStage::ToCook
        );
    }

    #[test]
    fn test_progress_rank_is_monotonic_along_happy_path() {
        let path = [
            OrderStatus::Draft,
            OrderStatus::SentToKitchen,
            OrderStatus::Preparing,
            OrderStatus::Completed,
            OrderStatus::Paid,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].progress_rank() < pair[1].progress_rank());
        }
    }
}
