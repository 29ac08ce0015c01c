//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

use crate::orders::traits::EventApplier;
use shared::order::{EventPayload, OrderEvent};

mod draft_deleted;
mod order_created;
mod payment_settled;
mod status_changed;

pub use draft_deleted::DraftDeletedApplier;
pub use order_created::OrderCreatedApplier;
pub use payment_settled::PaymentSettledApplier;
pub use status_changed::StatusChangedApplier;

/// EventAction enum - dispatches to concrete applier implementations
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    OrderCreated(OrderCreatedApplier),
    StatusChanged(StatusChangedApplier),
    PaymentSettled(PaymentSettledApplier),
    DraftDeleted(DraftDeletedApplier),
}

/// This is the ONLY place with a match on EventPayload.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::OrderCreated { .. } => EventAction::OrderCreated(OrderCreatedApplier),
            EventPayload::StatusChanged { .. } => EventAction::StatusChanged(StatusChangedApplier),
            EventPayload::PaymentSettled { .. } => {
                EventAction::PaymentSettled(PaymentSettledApplier)
            }
            EventPayload::DraftDeleted => EventAction::DraftDeleted(DraftDeletedApplier),
        }
    }
}
