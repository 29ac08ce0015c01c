//! SettlePayment command handler
//!
//! Validates a full payment against the order and emits `PaymentSettled`.
//! The manager stores the payment record and folds it into the session ledger
//! in the same transaction, so the three effects land together or not at all.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::{PaymentMethodConfig, PaymentRecord, PaymentRequest};
use shared::money::round_money;
use shared::order::{EventPayload, OrderEvent, OrderStatus, Transition};

#[derive(Debug, Clone)]
pub struct SettlePaymentAction {
    pub order_id: String,
    pub payment: PaymentRequest,
    /// Injected by the manager from server configuration
    pub payment_methods: PaymentMethodConfig,
}

#[async_trait]
impl CommandHandler for SettlePaymentAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Load order and check it can be settled
        let order = ctx.load_order(&self.order_id)?;
        if order.status == OrderStatus::Paid {
            return Err(OrderError::OrderAlreadyPaid(self.order_id.clone()));
        }
        // cancelled and draft orders fail here with the offending status
        order.status.next(Transition::SettlePayment)?;

        // 2. Amount must match the total exactly, at two decimal places
        let amount = self.payment.amount;
        if amount <= Decimal::ZERO {
            return Err(OrderError::InvalidAmount(amount));
        }
        if round_money(amount) != amount || amount != order.total_amount {
            return Err(OrderError::AmountMismatch {
                paid: amount,
                total: order.total_amount,
            });
        }

        // 3. Method must be enabled for this register
        if !self.payment_methods.is_enabled(self.payment.method) {
            return Err(OrderError::MethodDisabled(self.payment.method.to_string()));
        }

        // 4. Session must still be open to take the sale
        let session = ctx.load_session(&order.session_id)?;
        if !session.is_open() {
            return Err(OrderError::SessionClosed(session.session_id));
        }

        // 5. Emit
        let payment = PaymentRecord {
            payment_id: shared::util::new_id(),
            order_id: self.order_id.clone(),
            session_id: order.session_id.clone(),
            method: self.payment.method,
            amount,
            reference: self.payment.reference.clone(),
            operator_id: metadata.operator_id.clone(),
            created_at: shared::util::now_millis(),
        };
        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::PaymentSettled { payment },
        );

        Ok(vec![event])
    }
}
