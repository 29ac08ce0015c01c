//! StatusChanged event applier

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, Order, OrderEvent};

pub struct StatusChangedApplier;

impl EventApplier for StatusChangedApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        if let EventPayload::StatusChanged {
            to, kitchen_stage, ..
        } = &event.payload
        {
            order.status = *to;
            if kitchen_stage.is_some() {
                order.kitchen_stage = *kitchen_stage;
            }
            order.status_changed_at = event.timestamp;
            order.revision += 1;
            order.last_sequence = event.sequence;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{KitchenStage, OrderStatus, Transition};

    fn event(sequence: u64, payload: EventPayload) -> OrderEvent {
        OrderEvent::new(
            sequence,
            "o-1".to_string(),
            "u-1".to_string(),
            "Asha".to_string(),
            format!("cmd-{sequence}"),
            None,
            payload,
        )
    }

    #[test]
    fn test_status_changed_sets_stage() {
        let mut order = Order {
            order_id: "o-1".to_string(),
            status: OrderStatus::Draft,
            revision: 1,
            ..Default::default()
        };

        let sent = event(
            2,
            EventPayload::StatusChanged {
                transition: Transition::SendToKitchen,
                from: OrderStatus::Draft,
                to: OrderStatus::SentToKitchen,
                kitchen_stage: Some(KitchenStage::ToCook),
                reason: None,
            },
        );
        StatusChangedApplier.apply(&mut order, &sent);
        assert_eq!(order.status, OrderStatus::SentToKitchen);
        assert_eq!(order.kitchen_stage, Some(KitchenStage::ToCook));
        assert_eq!(order.revision, 2);
        assert_eq!(order.last_sequence, 2);
    }

    #[test]
    fn test_cancel_keeps_last_stage() {
        let mut order = Order {
            order_id: "o-1".to_string(),
            status: OrderStatus::Preparing,
            kitchen_stage: Some(KitchenStage::Preparing),
            ..Default::default()
        };
        let cancelled = event(
            5,
            EventPayload::StatusChanged {
                transition: Transition::Cancel,
                from: OrderStatus::Preparing,
                to: OrderStatus::Cancelled,
                kitchen_stage: None,
                reason: Some("customer left".to_string()),
            },
        );
        StatusChangedApplier.apply(&mut order, &cancelled);
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.kitchen_stage, Some(KitchenStage::Preparing));
    }
}
