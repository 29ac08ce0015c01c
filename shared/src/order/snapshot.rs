//! Order snapshot - current state of an order
//!
//! Lines are copied from the cart when the order is created and never change
//! afterwards; `total_amount` is frozen once the order is paid.

use super::lifecycle::{InvalidTransition, OrderVersion, TransitionOutcome};
use super::types::{CartSubmission, KitchenStage, OrderStatus, SubmittedLine, Transition};
use crate::money::{LineAmounts, Totals, line_amounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable copy of a cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_id: String,
    pub product_id: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    /// After discount, before tax
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl OrderLine {
    pub fn from_submitted(line_id: String, line: &SubmittedLine) -> Self {
        let amounts = line_amounts(
            line.quantity,
            line.unit_price,
            line.discount_percent,
            line.tax_percent,
        );
        Self {
            line_id,
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            discount_percent: line.discount_percent,
            tax_percent: line.tax_percent,
            subtotal: amounts.subtotal,
            discount: amounts.discount,
            tax: amounts.tax,
            note: line.note.clone(),
        }
    }

    pub fn amounts(&self) -> LineAmounts {
        LineAmounts {
            gross: self.subtotal + self.discount,
            discount: self.discount,
            subtotal: self.subtotal,
            tax: self.tax,
        }
    }

    pub fn total(&self) -> Decimal {
        self.subtotal + self.tax
    }
}

/// Order snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    /// Human readable, unique and monotonic
    pub order_number: String,
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
    pub lines: Vec<OrderLine>,
    pub status: OrderStatus,
    /// Set once the order reaches the kitchen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kitchen_stage: Option<KitchenStage>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    pub created_at: i64,
    pub status_changed_at: i64,
    /// Bumped by every applied change
    pub revision: u64,
    /// Sequence of the last event applied
    #[serde(default)]
    pub last_sequence: u64,
}

impl Order {
    /// Build a draft order from a cart submission
    pub fn from_submission(
        order_id: String,
        order_number: String,
        submission: &CartSubmission,
        created_at: i64,
    ) -> Self {
        let lines: Vec<OrderLine> = submission
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| OrderLine::from_submitted(format!("{order_id}-{}", i + 1), line))
            .collect();
        let mut order = Self {
            order_id,
            order_number,
            session_id: submission.session_id.clone(),
            table_id: submission.table_id.clone(),
            table_name: submission.table_name.clone(),
            customer_id: submission.customer_id.clone(),
            customer_name: submission.customer_name.clone(),
            note: submission.note.clone(),
            lines,
            status: OrderStatus::Draft,
            kitchen_stage: None,
            subtotal: Decimal::ZERO,
            discount: Decimal::ZERO,
            tax: Decimal::ZERO,
            total_amount: Decimal::ZERO,
            payment_id: None,
            created_at,
            status_changed_at: created_at,
            revision: 0,
            last_sequence: 0,
        };
        order.recalculate_totals();
        order
    }

    /// Recompute totals from the lines. No-op once paid.
    pub fn recalculate_totals(&mut self) {
        if self.status == OrderStatus::Paid {
            return;
        }
        let mut totals = Totals::default();
        for line in &self.lines {
            totals.add_line(&line.amounts());
        }
        self.subtotal = totals.subtotal;
        self.discount = totals.discount;
        self.tax = totals.tax;
        self.total_amount = totals.total;
    }

    pub fn version(&self) -> OrderVersion {
        OrderVersion {
            rank: self.status.progress_rank(),
            revision: self.revision,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Apply a transition in place.
    ///
    /// On error the order is left untouched.
    pub fn apply_transition(
        &mut self,
        transition: Transition,
        at: i64,
    ) -> Result<TransitionOutcome, InvalidTransition> {
        let Some(next) = self.status.next(transition)? else {
            return Ok(TransitionOutcome::Unchanged);
        };
        let from = self.status;
        self.status = next;
        if let Some(stage) = transition.kitchen_stage() {
            self.kitchen_stage = Some(stage);
        }
        self.status_changed_at = at;
        self.revision += 1;
        Ok(TransitionOutcome::Applied { from, to: next })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> CartSubmission {
        CartSubmission {
            session_id: "s-1".to_string(),
            table_id: Some("t-4".to_string()),
            table_name: Some("4".to_string()),
            customer_id: None,
            customer_name: Some("Ravi".to_string()),
            note: None,
            lines: vec![
                SubmittedLine {
                    product_id: "p-1".to_string(),
                    name: "Masala Chai".to_string(),
                    quantity: 2,
                    unit_price: Decimal::new(10000, 2),
                    discount_percent: Decimal::ZERO,
                    tax_percent: Decimal::ZERO,
                    note: String::new(),
                },
                SubmittedLine {
                    product_id: "p-2".to_string(),
                    name: "Brownie".to_string(),
                    quantity: 1,
                    unit_price: Decimal::new(5000, 2),
                    discount_percent: Decimal::ZERO,
                    tax_percent: Decimal::new(18, 0),
                    note: String::new(),
                },
            ],
        }
    }

    #[test]
    fn test_from_submission_snapshots_lines_and_totals() {
        let order = Order::from_submission("o-1".into(), "BR1".into(), &submission(), 100);
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.kitchen_stage, None);
        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.lines[1].tax, Decimal::new(900, 2));
        assert_eq!(order.subtotal, Decimal::new(25000, 2));
        assert_eq!(order.tax, Decimal::new(900, 2));
        assert_eq!(order.total_amount, Decimal::new(25900, 2));
    }

    #[test]
    fn test_apply_transition_sets_stage_and_revision() {
        let mut order = Order::from_submission("o-1".into(), "BR1".into(), &submission(), 100);
        let outcome = order.apply_transition(Transition::SendToKitchen, 200).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(order.kitchen_stage, Some(KitchenStage::ToCook));
        assert_eq!(order.status_changed_at, 200);
        assert_eq!(order.revision, 1);

        order.apply_transition(Transition::BeginPreparing, 300).unwrap();
        let again = order.apply_transition(Transition::BeginPreparing, 400).unwrap();
        assert_eq!(again, TransitionOutcome::Unchanged);
        assert_eq!(order.revision, 2);
        assert_eq!(order.status_changed_at, 300);
    }

    #[test]
    fn test_cancel_keeps_last_kitchen_stage() {
        let mut order = Order::from_submission("o-1".into(), "BR1".into(), &submission(), 100);
        order.apply_transition(Transition::SendToKitchen, 1).unwrap();
        order.apply_transition(Transition::Cancel, 2).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.kitchen_stage, Some(KitchenStage::ToCook));
    }

    #[test]
    fn test_terminal_order_unchanged_on_error() {
        let mut order = Order::from_submission("o-1".into(), "BR1".into(), &submission(), 100);
        order.apply_transition(Transition::Cancel, 5).unwrap();
        let before = order.clone();
        assert!(order.apply_transition(Transition::SendToKitchen, 6).is_err());
        assert_eq!(order, before);
    }

    #[test]
    fn test_paid_total_is_frozen() {
        let mut order = Order::from_submission("o-1".into(), "BR1".into(), &submission(), 100);
        order.apply_transition(Transition::SendToKitchen, 1).unwrap();
        order.apply_transition(Transition::SettlePayment, 2).unwrap();
        order.lines.clear();
        order.recalculate_totals();
        assert_eq!(order.total_amount, Decimal::new(25900, 2));
    }
}
