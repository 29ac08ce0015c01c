//! DraftDeleted event applier
//!
//! The manager drops the snapshot after this event; the applier only keeps
//! replay consistent.

use crate::orders::traits::EventApplier;
use shared::order::{Order, OrderEvent};

pub struct DraftDeletedApplier;

impl EventApplier for DraftDeletedApplier {
    fn apply(&self, order: &mut Order, event: &OrderEvent) {
        order.last_sequence = event.sequence;
    }
}
