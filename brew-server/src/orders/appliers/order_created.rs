//! OrderCreated event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, Order, OrderEvent};

/// Replaces the snapshot with the order carried by the event
pub struct OrderCreatedApplier;

impl EventApplier for OrderCreatedApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        if let EventPayload::OrderCreated { order: created } = &event.payload {
            *order = created.as_ref().clone();
            order.order_id = event.order_id.clone();
            order.revision = 1;
            order.last_sequence = event.sequence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::order::{CartSubmission, OrderStatus, SubmittedLine};

    #[test]
    fn test_order_created_applier() {
        let submission = CartSubmission {
            session_id: "s-1".to_string(),
            table_id: None,
            table_name: None,
            customer_id: None,
            customer_name: Some("Ravi".to_string()),
            note: None,
            lines: vec![SubmittedLine {
                product_id: "p-1".to_string(),
                name: "Cappuccino".to_string(),
                quantity: 2,
                unit_price: Decimal::new(15000, 2),
                discount_percent: Decimal::ZERO,
                tax_percent: Decimal::from(5),
                note: String::new(),
            }],
        };
        let created = Order::from_submission("o-1".to_string(), "B1".to_string(), &submission, 10);
        let event = OrderEvent::new(
            7,
            "o-1".to_string(),
            "u-1".to_string(),
            "Asha".to_string(),
            "cmd-1".to_string(),
            Some(10),
            EventPayload::OrderCreated {
                order: Box::new(created),
            },
        );

        let mut order = Order::default();
        OrderCreatedApplier.apply(&mut order, &event);

        assert_eq!(order.order_id, "o-1");
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.total_amount, Decimal::new(31500, 2));
        assert_eq!(order.revision, 1);
        assert_eq!(order.last_sequence, 7);
    }
}
