//! Transition command handler
//!
//! Kitchen advances (`send_to_kitchen`, `begin_preparing`, `mark_ready`) and
//! `cancel`. Requesting the status an order already has emits nothing, so two
//! terminals racing on the same advance both succeed.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, OrderEvent, Transition, TransitionOutcome};

#[derive(Debug, Clone)]
pub struct TransitionAction {
    pub order_id: String,
    pub transition: Transition,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for TransitionAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.transition == Transition::SettlePayment {
            return Err(OrderError::InvalidOperation(
                "orders are marked paid by settling a payment".to_string(),
            ));
        }

        let mut order = ctx.load_order(&self.order_id)?;
        let outcome = order.apply_transition(self.transition, shared::util::now_millis())?;
        let TransitionOutcome::Applied { from, to } = outcome else {
            tracing::debug!(
                order_id = %self.order_id,
                transition = %self.transition,
                "Transition already applied, nothing to do"
            );
            return Ok(vec![]);
        };

        let seq = ctx.next_sequence();
        let event = OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::StatusChanged {
                transition: self.transition,
                from,
                to,
                kitchen_stage: self.transition.kitchen_stage(),
                reason: self.reason.clone(),
            },
        );

        Ok(vec![event])
    }
}
