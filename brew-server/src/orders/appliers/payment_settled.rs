//! PaymentSettled event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, Order, OrderEvent, OrderStatus};

/// Marks the order paid. Totals are frozen from here on.
pub struct PaymentSettledApplier;

impl EventApplier for PaymentSettledApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        if let EventPayload::PaymentSettled { payment } = &event.payload {
            order.status = OrderStatus::Paid;
            order.payment_id = Some(payment.payment_id.clone());
            order.status_changed_at = event.timestamp;
            order.revision += 1;
            order.last_sequence = event.sequence;
        }
    }
}
