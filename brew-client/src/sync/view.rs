//! Local order view fed by polls and action responses
//!
//! Every write goes through the version comparator: an incoming copy
//! replaces the held one only when its lifecycle rank is higher, or the rank
//! is equal and its revision is higher. A response that was in flight while
//! a newer copy arrived can therefore never move an order backwards.

use std::collections::HashMap;

use parking_lot::RwLock;
use shared::order::Order;

/// What happened to one incoming copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Merge {
    Inserted,
    Updated,
    /// Same version as the held copy
    Unchanged,
    /// Older than the held copy; discarded
    Stale,
}

/// Whether `incoming` may replace `held`
pub fn supersedes(incoming: &Order, held: &Order) -> bool {
    incoming.version() > held.version()
}

/// Outcome of applying one poll result
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub inserted: usize,
    pub updated: usize,
    pub stale: usize,
    /// Orders no longer returned by the query
    pub removed: usize,
}

impl PollReport {
    pub fn changed(&self) -> bool {
        self.inserted + self.updated + self.removed > 0
    }
}

#[derive(Debug, Default)]
pub struct OrderView {
    orders: RwLock<HashMap<String, Order>>,
}

impl OrderView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.read().get(order_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.orders.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.read().is_empty()
    }

    /// Orders oldest first, for display
    pub fn snapshot(&self) -> Vec<Order> {
        let mut orders: Vec<Order> = self.orders.read().values().cloned().collect();
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.order_number.cmp(&b.order_number))
        });
        orders
    }

    /// Merge one authoritative copy
    pub fn merge(&self, incoming: Order) -> Merge {
        let mut orders = self.orders.write();
        Self::merge_locked(&mut orders, incoming)
    }

    fn merge_locked(orders: &mut HashMap<String, Order>, incoming: Order) -> Merge {
        match orders.get(&incoming.order_id) {
            None => {
                orders.insert(incoming.order_id.clone(), incoming);
                Merge::Inserted
            }
            Some(held) if supersedes(&incoming, held) => {
                orders.insert(incoming.order_id.clone(), incoming);
                Merge::Updated
            }
            Some(held) if held.version() == incoming.version() => Merge::Unchanged,
            Some(held) => {
                tracing::debug!(
                    order_id = %incoming.order_id,
                    held = %held.status,
                    incoming = %incoming.status,
                    "Discarding stale order copy"
                );
                Merge::Stale
            }
        }
    }

    /// Apply a full query result.
    ///
    /// Orders the query no longer returns leave the view; returned orders go
    /// through the comparator.
    pub fn apply_poll(&self, result: Vec<Order>) -> PollReport {
        let mut report = PollReport::default();
        let mut orders = self.orders.write();

        let before = orders.len();
        let returned: std::collections::HashSet<String> =
            result.iter().map(|o| o.order_id.clone()).collect();
        orders.retain(|id, _| returned.contains(id));
        report.removed = before - orders.len();

        for order in result {
            match Self::merge_locked(&mut orders, order) {
                Merge::Inserted => report.inserted += 1,
                Merge::Updated => report.updated += 1,
                Merge::Stale => report.stale += 1,
                Merge::Unchanged => {}
            }
        }
        report
    }

    /// Replace without comparison. Only for provisional optimistic state.
    pub(crate) fn put(&self, order: Order) {
        self.orders.write().insert(order.order_id.clone(), order);
    }

    /// Store `next`, but only if the view still holds `provisional`
    pub(crate) fn replace_if_current(&self, provisional: &Order, next: Order) -> bool {
        let mut orders = self.orders.write();
        match orders.get(&provisional.order_id) {
            Some(held) if held == provisional => {
                orders.insert(next.order_id.clone(), next);
                true
            }
            _ => false,
        }
    }

    pub fn remove(&self, order_id: &str) -> Option<Order> {
        self.orders.write().remove(order_id)
    }
}
