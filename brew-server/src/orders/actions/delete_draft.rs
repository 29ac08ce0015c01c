//! DeleteDraft command handler

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, InvalidTransition, OrderEvent, OrderStatus, Transition};

#[derive(Debug, Clone)]
pub struct DeleteDraftAction {
    pub order_id: String,
}

#[async_trait]
impl CommandHandler for DeleteDraftAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let order = ctx.load_order(&self.order_id)?;
        // Anything the kitchen has seen must be cancelled instead
        if order.status != OrderStatus::Draft {
            return Err(InvalidTransition {
                transition: Transition::Cancel,
                status: order.status,
            }
            .into());
        }

        let seq = ctx.next_sequence();
        Ok(vec![OrderEvent::new(
            seq,
            self.order_id.clone(),
            metadata.operator_id.clone(),
            metadata.operator_name.clone(),
            metadata.command_id.clone(),
            Some(metadata.timestamp),
            EventPayload::DraftDeleted,
        )])
    }
}
