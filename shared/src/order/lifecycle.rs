//! Order state machine
//!
//! ```text
//! draft ──send_to_kitchen──> sent_to_kitchen ──begin_preparing──> preparing ──mark_ready──> completed
//!   │                              │                                  │                        │
//!   └──────────── cancel ──────────┴──────────────────────────────────┘                        │
//!                                  └──────────── settle_payment (sent/preparing/completed) ────┴──> paid
//! ```
//!
//! Kitchen advances never move backward and never skip a stage. Asking for the
//! stage an order is already in is a no-op so racing terminals do not error.
//! Nothing leaves `paid` or `cancelled`.

use super::types::{KitchenStage, OrderStatus, Transition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[error("cannot {transition} an order that is {status}")]
pub struct InvalidTransition {
    pub transition: Transition,
    pub status: OrderStatus,
}

/// Result of a legal transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied { from: OrderStatus, to: OrderStatus },
    /// The order was already where the transition leads
    Unchanged,
}

impl TransitionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

impl Transition {
    /// Status this transition leads to
    pub const fn target(&self) -> OrderStatus {
        match self {
            Self::SendToKitchen => OrderStatus::SentToKitchen,
            Self::BeginPreparing => OrderStatus::Preparing,
            Self::MarkReady => OrderStatus::Completed,
            Self::SettlePayment => OrderStatus::Paid,
            Self::Cancel => OrderStatus::Cancelled,
        }
    }

    /// Kitchen stage set by this transition, if any
    pub const fn kitchen_stage(&self) -> Option<KitchenStage> {
        match self {
            Self::SendToKitchen => Some(KitchenStage::ToCook),
            Self::BeginPreparing => Some(KitchenStage::Preparing),
            Self::MarkReady => Some(KitchenStage::Completed),
            Self::SettlePayment | Self::Cancel => None,
        }
    }

    /// Statuses from which the transition applies
    const fn sources(&self) -> &'static [OrderStatus] {
        match self {
            Self::SendToKitchen => &[OrderStatus::Draft],
            Self::BeginPreparing => &[OrderStatus::SentToKitchen],
            Self::MarkReady => &[OrderStatus::Preparing],
            Self::SettlePayment => &[
                OrderStatus::SentToKitchen,
                OrderStatus::Preparing,
                OrderStatus::Completed,
            ],
            Self::Cancel => &[
                OrderStatus::Draft,
                OrderStatus::SentToKitchen,
                OrderStatus::Preparing,
            ],
        }
    }
}

impl OrderStatus {
    /// Resolve `transition` against this status.
    ///
    /// `Ok(Some(next))` moves the order, `Ok(None)` means it is already there.
    pub fn next(self, transition: Transition) -> Result<Option<OrderStatus>, InvalidTransition> {
        let invalid = InvalidTransition {
            transition,
            status: self,
        };
        if self.is_terminal() {
            return Err(invalid);
        }
        let target = transition.target();
        if self == target {
            return Ok(None);
        }
        if transition.sources().contains(&self) {
            Ok(Some(target))
        } else {
            Err(invalid)
        }
    }
}

/// Ordering key used to reject stale copies of an order.
///
/// Compares lifecycle progress first, then the server revision. A copy whose
/// version is lower than the held one is older by transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderVersion {
    pub rank: u8,
    pub revision: u64,
}
