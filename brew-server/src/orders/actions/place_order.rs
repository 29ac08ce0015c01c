//! PlaceOrder / SaveDraft command handler
//!
//! Creates the order from a cart submission. A placed order goes straight to
//! the kitchen; a saved draft stays out of it until `send_to_kitchen`.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{CartSubmission, EventPayload, Order, OrderEvent, Transition};

#[derive(Debug, Clone)]
pub struct PlaceOrderAction {
    pub order_id: String,
    /// Allocated by the manager inside the same transaction
    pub order_number: String,
    pub submission: CartSubmission,
    pub send_to_kitchen: bool,
}

#[async_trait]
impl CommandHandler for PlaceOrderAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // 1. Validate cart shape
        self.submission.validate()?;

        // 2. Orders can only be taken under an open session
        let session = ctx.load_session(&self.submission.session_id)?;
        if !session.is_open() {
            return Err(OrderError::SessionClosed(session.session_id));
        }

        // 3. Build the snapshot
        let now = shared::util::now_millis();
        let mut order = Order::from_submission(
            self.order_id.clone(),
            self.order_number.clone(),
            &self.submission,
            now,
        );
        if self.send_to_kitchen {
            order.apply_transition(Transition::SendToKitchen, now)?;
        }

        // 4. Emit
        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::OrderCreated {
                order: Box::new(order),
            },
        );

        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::actions::test_support::{metadata, session, storages, submission};
    use rust_decimal::Decimal;
    use shared::order::{KitchenStage, OrderStatus, SubmissionError};

    fn action(send_to_kitchen: bool, lines: &[(i32, i64, i64)]) -> PlaceOrderAction {
        PlaceOrderAction {
            order_id: "o-1".to_string(),
            order_number: "BR202610191".to_string(),
            submission: submission(lines),
            send_to_kitchen,
        }
    }

    #[tokio::test]
    async fn test_place_order_goes_to_kitchen() {
        let (storage, sessions) = storages();
        let txn = storage.begin_write().unwrap();
        sessions.store_session(&txn, &session("s-1", true)).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &sessions, 0);

        let events = action(true, &[(2, 10000, 0), (1, 5000, 18)])
            .execute(&mut ctx, &metadata())
            .await
            .unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].sequence, 1);
        let EventPayload::OrderCreated { order } = &events[0].payload else {
            panic!("Expected OrderCreated payload");
        };
        assert_eq!(order.status, OrderStatus::SentToKitchen);
        assert_eq!(order.kitchen_stage, Some(KitchenStage::ToCook));
        assert_eq!(order.total_amount, Decimal::new(25900, 2));
        assert_eq!(order.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_save_draft_stays_out_of_kitchen() {
        let (storage, sessions) = storages();
        let txn = storage.begin_write().unwrap();
        sessions.store_session(&txn, &session("s-1", true)).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &sessions, 0);

        let events = action(false, &[(1, 10000, 0)])
            .execute(&mut ctx, &metadata())
            .await
            .unwrap();
        let EventPayload::OrderCreated { order } = &events[0].payload else {
            panic!("Expected OrderCreated payload");
        };
        assert_eq!(order.status, OrderStatus::Draft);
        assert_eq!(order.kitchen_stage, None);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let (storage, sessions) = storages();
        let txn = storage.begin_write().unwrap();
        sessions.store_session(&txn, &session("s-1", true)).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &sessions, 0);

        let result = action(true, &[]).execute(&mut ctx, &metadata()).await;
        assert!(matches!(
            result,
            Err(OrderError::InvalidSubmission(SubmissionError::Empty))
        ));
    }

    #[tokio::test]
    async fn test_closed_session_rejected() {
        let (storage, sessions) = storages();
        let txn = storage.begin_write().unwrap();
        sessions.store_session(&txn, &session("s-1", false)).unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &sessions, 0);

        let result = action(true, &[(1, 100, 0)]).execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::SessionClosed(_))));
    }

    #[tokio::test]
    async fn test_unknown_session_rejected() {
        let (storage, sessions) = storages();
        let txn = storage.begin_write().unwrap();
        let mut ctx = CommandContext::new(&txn, &storage, &sessions, 0);

        let result = action(true, &[(1, 100, 0)]).execute(&mut ctx, &metadata()).await;
        assert!(matches!(result, Err(OrderError::SessionNotFound(_))));
    }
}
