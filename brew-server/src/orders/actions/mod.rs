//! Command action implementations
//!
//! Each action implements the `CommandHandler` trait and handles
//! one specific command type.

use async_trait::async_trait;

use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::models::PaymentMethodConfig;
use shared::order::{OrderCommand, OrderCommandPayload, OrderEvent};

mod delete_draft;
mod place_order;
mod settle_payment;
mod transition;

pub use delete_draft::DeleteDraftAction;
pub use place_order::PlaceOrderAction;
pub use settle_payment::SettlePaymentAction;
pub use transition::TransitionAction;

/// CommandAction enum - dispatches to concrete action implementations
pub enum CommandAction {
    PlaceOrder(PlaceOrderAction),
    Transition(TransitionAction),
    DeleteDraft(DeleteDraftAction),
    SettlePayment(SettlePaymentAction),
}

#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::PlaceOrder(action) => action.execute(ctx, metadata).await,
            CommandAction::Transition(action) => action.execute(ctx, metadata).await,
            CommandAction::DeleteDraft(action) => action.execute(ctx, metadata).await,
            CommandAction::SettlePayment(action) => action.execute(ctx, metadata).await,
        }
    }
}

/// Values the manager resolves before an action runs
pub struct ActionInputs<'a> {
    /// Fresh id and number for a command that creates an order
    pub new_order: Option<(String, String)>,
    pub payment_methods: &'a PaymentMethodConfig,
}

impl CommandAction {
    /// Convert an OrderCommand into its action.
    ///
    /// This is the ONLY place with a match on OrderCommandPayload.
    pub fn build(cmd: &OrderCommand, inputs: ActionInputs<'_>) -> Result<Self, OrderError> {
        let action = match &cmd.payload {
            OrderCommandPayload::PlaceOrder { submission }
            | OrderCommandPayload::SaveDraft { submission } => {
                let (order_id, order_number) = inputs.new_order.ok_or_else(|| {
                    OrderError::InvalidOperation("order number was not allocated".to_string())
                })?;
                CommandAction::PlaceOrder(PlaceOrderAction {
                    order_id,
                    order_number,
                    submission: submission.clone(),
                    send_to_kitchen: matches!(
                        cmd.payload,
                        OrderCommandPayload::PlaceOrder { .. }
                    ),
                })
            }
            OrderCommandPayload::Transition {
                order_id,
                transition,
                reason,
            } => CommandAction::Transition(TransitionAction {
                order_id: order_id.clone(),
                transition: *transition,
                reason: reason.clone(),
            }),
            OrderCommandPayload::DeleteDraft { order_id } => {
                CommandAction::DeleteDraft(DeleteDraftAction {
                    order_id: order_id.clone(),
                })
            }
            OrderCommandPayload::SettlePayment { order_id, payment } => {
                CommandAction::SettlePayment(SettlePaymentAction {
                    order_id: order_id.clone(),
                    payment: payment.clone(),
                    payment_methods: inputs.payment_methods.clone(),
                })
            }
        };
        Ok(action)
    }
}
