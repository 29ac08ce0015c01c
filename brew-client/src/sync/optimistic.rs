//! Provisional local state for a pending action

use std::sync::Arc;

use shared::order::Order;

use super::view::{Merge, OrderView};

/// Snapshot taken before an optimistic update, used to undo it.
///
/// Dropping an action that was neither confirmed nor rolled back rolls it
/// back, so an abandoned request never leaves its provisional copy behind.
#[derive(Debug)]
pub struct PendingAction {
    view: Arc<OrderView>,
    snapshot: Order,
    provisional: Order,
    resolved: bool,
}

impl PendingAction {
    /// Apply `update` to the held copy of `order_id`.
    ///
    /// Returns `Ok(None)` when the view does not hold the order; the action
    /// then proceeds without a provisional state.
    pub fn begin<E>(
        view: &Arc<OrderView>,
        order_id: &str,
        update: impl FnOnce(&mut Order) -> Result<(), E>,
    ) -> Result<Option<Self>, E> {
        let Some(snapshot) = view.get(order_id) else {
            return Ok(None);
        };
        let mut provisional = snapshot.clone();
        update(&mut provisional)?;
        view.put(provisional.clone());
        Ok(Some(Self {
            view: Arc::clone(view),
            snapshot,
            provisional,
            resolved: false,
        }))
    }

    pub fn provisional(&self) -> &Order {
        &self.provisional
    }

    /// Server accepted: its copy replaces the provisional one.
    ///
    /// If a poll dropped the order meanwhile, the response is late and is
    /// not re-inserted.
    pub fn confirm(mut self, authoritative: Order) -> Merge {
        self.resolved = true;
        if self
            .view
            .replace_if_current(&self.provisional, authoritative.clone())
        {
            return Merge::Updated;
        }
        if self.view.get(&authoritative.order_id).is_none() {
            return Merge::Stale;
        }
        self.view.merge(authoritative)
    }

    /// Server rejected or unreachable: undo unless something newer landed
    pub fn rollback(mut self) -> bool {
        self.resolved = true;
        self.restore()
    }

    fn restore(&self) -> bool {
        let restored = self
            .view
            .replace_if_current(&self.provisional, self.snapshot.clone());
        if !restored {
            tracing::debug!(
                order_id = %self.provisional.order_id,
                "Skipping rollback, view already moved on"
            );
        }
        restored
    }
}

impl Drop for PendingAction {
    fn drop(&mut self) {
        if !self.resolved {
            tracing::warn!(
                order_id = %self.provisional.order_id,
                "Pending action abandoned, rolling back"
            );
            self.restore();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{InvalidTransition, OrderStatus, Transition};

    fn sent(id: &str) -> Order {
        Order {
            order_id: id.to_string(),
            status: OrderStatus::SentToKitchen,
            revision: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_rollback_restores_snapshot() {
        let view = Arc::new(OrderView::new());
        view.merge(sent("o-1"));

        let pending = PendingAction::begin(&view, "o-1", |o| {
            o.apply_transition(Transition::BeginPreparing, 5).map(|_| ())
        })
        .unwrap()
        .unwrap();
        assert_eq!(view.get("o-1").unwrap().status, OrderStatus::Preparing);

        assert!(pending.rollback());
        assert_eq!(view.get("o-1").unwrap(), sent("o-1"));
    }

    #[test]
    fn test_confirm_takes_server_copy() {
        let view = Arc::new(OrderView::new());
        view.merge(sent("o-1"));
        let pending = PendingAction::begin(&view, "o-1", |o| {
            o.apply_transition(Transition::BeginPreparing, 5).map(|_| ())
        })
        .unwrap()
        .unwrap();

        let mut server = sent("o-1");
        server.apply_transition(Transition::BeginPreparing, 7).unwrap();
        assert_eq!(pending.confirm(server.clone()), Merge::Updated);
        assert_eq!(view.get("o-1").unwrap().status_changed_at, 7);
    }

    #[test]
    fn test_abandoned_action_rolls_back_on_drop() {
        let view = Arc::new(OrderView::new());
        view.merge(sent("o-1"));
        let pending = PendingAction::begin(&view, "o-1", |o| {
            o.apply_transition(Transition::BeginPreparing, 5).map(|_| ())
        })
        .unwrap();
        assert_eq!(view.get("o-1").unwrap().status, OrderStatus::Preparing);

        drop(pending);
        assert_eq!(view.get("o-1").unwrap(), sent("o-1"));
        // the restored copy accepts the server's answer again
        let mut server = sent("o-1");
        server.apply_transition(Transition::BeginPreparing, 9).unwrap();
        assert_eq!(view.merge(server), Merge::Updated);
    }

    #[test]
    fn test_resolved_action_does_not_roll_back_on_drop() {
        let view = Arc::new(OrderView::new());
        view.merge(sent("o-1"));
        let pending = PendingAction::begin(&view, "o-1", |o| {
            o.apply_transition(Transition::BeginPreparing, 5).map(|_| ())
        })
        .unwrap()
        .unwrap();
        let provisional = pending.provisional().clone();
        pending.confirm(provisional.clone());
        assert_eq!(view.get("o-1").unwrap(), provisional);
    }

    #[test]
    fn test_invalid_update_leaves_view_untouched() {
        let view = Arc::new(OrderView::new());
        view.merge(sent("o-1"));
        let result: Result<_, InvalidTransition> = PendingAction::begin(&view, "o-1", |o| {
            o.apply_transition(Transition::MarkReady, 5).map(|_| ())
        });
        assert!(result.is_err());
        assert_eq!(view.get("o-1").unwrap(), sent("o-1"));
    }

    #[test]
    fn test_unknown_order_has_no_provisional_state() {
        let view = Arc::new(OrderView::new());
        let pending: Option<PendingAction> =
            PendingAction::begin::<InvalidTransition>(&view, "o-9", |_| Ok(())).unwrap();
        assert!(pending.is_none());
        assert!(view.is_empty());
    }
}
