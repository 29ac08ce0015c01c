//! Order command pipeline
//!
//! [`OrdersManager`] is the single writer for orders. A command becomes
//! events, events fold into snapshots, and the whole result (events,
//! snapshots, payment record, ledger counters, processed marker) lands in one
//! redb write transaction. Subscribers see events only after commit.
//!
//! ```text
//! execute_command(cmd)
//!     ├─ seen command_id?  -> answer from the first outcome
//!     ├─ begin write txn, re-check command_id
//!     ├─ new order: allocate id and number inside the txn
//!     ├─ CommandAction::execute  -> events
//!     ├─ EventAction::apply      -> snapshots
//!     ├─ store events, snapshots; settlements also write payment + ledger
//!     ├─ mark processed, commit
//!     └─ broadcast
//! ```

mod error;
pub use error::*;

use super::actions::{ActionInputs, CommandAction};
use super::appliers::EventAction;
use super::storage::{OrderStorage, ProcessedCommand, StorageError};
use super::traits::{CommandContext, CommandHandler, CommandMetadata, EventApplier, OrderError};
use crate::sessions::{SessionLedger, SessionStorage};
use chrono::Local;
use shared::models::{PaymentMethodConfig, PaymentRecord};
use shared::order::{
    CommandResponse, EventPayload, KitchenStage, KitchenStats, Order, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderFilter, OrderStatus,
};
use std::path::Path;
use tokio::sync::broadcast;

/// Event broadcast channel capacity
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Default prefix of human readable order numbers
pub const DEFAULT_ORDER_NUMBER_PREFIX: &str = "BR";

/// Authoritative order store.
///
/// `epoch` changes on every start, so a terminal that sees a new value knows
/// its event cursor is meaningless and reloads.
#[derive(Clone)]
pub struct OrdersManager {
    storage: OrderStorage,
    ledger: SessionLedger,
    event_tx: broadcast::Sender<OrderEvent>,
    epoch: String,
    payment_methods: PaymentMethodConfig,
    order_number_prefix: String,
}

impl std::fmt::Debug for OrdersManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdersManager")
            .field("storage", &"<OrderStorage>")
            .field("event_tx", &"<broadcast::Sender>")
            .field("epoch", &self.epoch)
            .finish()
    }
}

impl OrdersManager {
    /// Open (or create) the store at `db_path`
    pub fn new(db_path: impl AsRef<Path>) -> ManagerResult<Self> {
        let storage = OrderStorage::open(db_path)?;
        Self::with_storage(storage)
    }

    /// Create an OrdersManager over an opened storage
    pub fn with_storage(storage: OrderStorage) -> ManagerResult<Self> {
        let ledger = SessionLedger::new(SessionStorage::new(storage.database())?);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "Order store opened");
        Ok(Self {
            storage,
            ledger,
            event_tx,
            epoch,
            payment_methods: PaymentMethodConfig::default(),
            order_number_prefix: DEFAULT_ORDER_NUMBER_PREFIX.to_string(),
        })
    }

    pub fn set_payment_methods(&mut self, payment_methods: PaymentMethodConfig) {
        self.payment_methods = payment_methods;
    }

    pub fn set_order_number_prefix(&mut self, prefix: impl Into<String>) {
        self.order_number_prefix = prefix.into();
    }

    pub fn payment_methods(&self) -> &PaymentMethodConfig {
        &self.payment_methods
    }

    /// Changes on every start
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    pub fn storage(&self) -> &OrderStorage {
        &self.storage
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// Run one command; failures come back inside the response
    pub fn execute_command(&self, cmd: OrderCommand) -> CommandResponse {
        let command_id = cmd.command_id.clone();
        match self.process_command(cmd) {
            Ok((response, events)) => {
                for event in events {
                    if self.event_tx.send(event).is_err() {
                        tracing::trace!("No event subscribers");
                        break;
                    }
                }
                response
            }
            Err(err) => {
                tracing::warn!(command_id = %command_id, error = %err, "Command rejected");
                CommandResponse::error(command_id, err.into())
            }
        }
    }

    /// Order number: `<prefix><yyyymmdd><10000 + count>`
    fn next_order_number(&self, txn: &redb::WriteTransaction) -> ManagerResult<String> {
        let count = self.storage.next_order_count_txn(txn)?;
        let date_str = Local::now().format("%Y%m%d");
        Ok(format!(
            "{}{}{}",
            self.order_number_prefix,
            date_str,
            10000 + count
        ))
    }

    /// Run a command, returning the events to broadcast.
    ///
    /// Everything a command changes is written in one redb transaction; an
    /// error anywhere drops the transaction and nothing is observed.
    fn process_command(
        &self,
        cmd: OrderCommand,
    ) -> ManagerResult<(CommandResponse, Vec<OrderEvent>)> {
        tracing::debug!(command_id = %cmd.command_id, payload = ?cmd.payload, "Command received");

        // Replay check outside the txn
        if let Some(processed) = self.storage.get_processed_command(&cmd.command_id)? {
            tracing::info!(command_id = %cmd.command_id, "Replayed command, returning first outcome");
            return Ok((
                CommandResponse::duplicate(cmd.command_id, processed.order_id),
                vec![],
            ));
        }

        // Single writer from here on
        let txn = self.storage.begin_write()?;

        // a concurrent writer may have committed the same command meanwhile
        if let Some(processed) = self.storage.get_processed_command_txn(&txn, &cmd.command_id)? {
            tracing::info!(command_id = %cmd.command_id, "Replayed command won by another writer");
            return Ok((
                CommandResponse::duplicate(cmd.command_id, processed.order_id),
                vec![],
            ));
        }

        let current_sequence = self.storage.current_sequence_txn(&txn)?;

        // Numbers are allocated in the txn, so a rejected order burns none
        let new_order = match &cmd.payload {
            OrderCommandPayload::PlaceOrder { .. } | OrderCommandPayload::SaveDraft { .. } => {
                let order_number = self.next_order_number(&txn)?;
                tracing::debug!(order_number = %order_number, "Allocated order number");
                Some((shared::util::new_id(), order_number))
            }
            _ => None,
        };

        // command -> events
        let metadata = CommandMetadata {
            command_id: cmd.command_id.clone(),
            operator_id: cmd.operator_id.clone(),
            operator_name: cmd.operator_name.clone(),
            timestamp: cmd.timestamp,
        };
        let action = CommandAction::build(
            &cmd,
            ActionInputs {
                new_order,
                payment_methods: &self.payment_methods,
            },
        )?;
        let mut ctx = CommandContext::new(
            &txn,
            &self.storage,
            self.ledger.storage(),
            current_sequence,
        );
        let events = futures::executor::block_on(action.execute(&mut ctx, &metadata))?;

        // events -> snapshots
        for event in &events {
            if matches!(event.payload, EventPayload::DraftDeleted) {
                ctx.remove_order(&event.order_id);
                continue;
            }
            let mut order = ctx.load_order(&event.order_id).unwrap_or_else(|_| Order {
                order_id: event.order_id.clone(),
                ..Default::default()
            });
            let applier: EventAction = event.into();
            applier.apply(&mut order, event);
            ctx.save_order(order);
        }

        // persist
        for event in &events {
            self.storage.store_event(&txn, event)?;
        }
        for order in ctx.modified_orders() {
            self.storage.store_order(&txn, order)?;
        }
        for order_id in ctx.removed_orders() {
            self.storage.remove_order(&txn, order_id)?;
        }

        // 6b. Settlements write the payment and the ledger in the same transaction
        for event in &events {
            if let EventPayload::PaymentSettled { payment } = &event.payload {
                let order = ctx.load_order(&event.order_id)?;
                self.record_settlement(&txn, &order, payment)?;
            }
        }

        // sequence counter
        let max_sequence = events
            .iter()
            .map(|e| e.sequence)
            .max()
            .unwrap_or(current_sequence);
        if max_sequence > current_sequence {
            self.storage.set_sequence(&txn, max_sequence)?;
        }

        // replay marker
        let order_id = cmd
            .order_id()
            .map(str::to_string)
            .or_else(|| events.first().map(|e| e.order_id.clone()));
        self.storage.mark_command_processed(
            &txn,
            &cmd.command_id,
            &ProcessedCommand {
                order_id: order_id.clone(),
                processed_at: shared::util::now_millis(),
            },
        )?;

        // commit
        drop(ctx);
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            command_id = %cmd.command_id,
            order_id = ?order_id,
            events = events.len(),
            "Command committed"
        );
        Ok((CommandResponse::success(cmd.command_id, order_id), events))
    }

    fn record_settlement(
        &self,
        txn: &redb::WriteTransaction,
        order: &Order,
        payment: &PaymentRecord,
    ) -> ManagerResult<()> {
        if !self.storage.store_payment(txn, payment)? {
            return Err(OrderError::OrderAlreadyPaid(order.order_id.clone()).into());
        }
        self.ledger.record_order_txn(txn, order, payment)?;
        tracing::info!(
            order_id = %order.order_id,
            session_id = %order.session_id,
            method = %payment.method,
            amount = %payment.amount,
            "Payment settled"
        );
        Ok(())
    }

    // ========== Public Query Methods ==========

    /// Get an order by ID
    pub fn get_order(&self, order_id: &str) -> ManagerResult<Option<Order>> {
        Ok(self.storage.get_order(order_id)?)
    }

    /// List orders matching a filter, oldest first
    pub fn list_orders(&self, filter: &OrderFilter) -> ManagerResult<Vec<Order>> {
        Ok(self.storage.list_orders(filter)?)
    }

    /// Orders the kitchen display shows, optionally for one stage
    pub fn kitchen_queue(&self, stage: Option<KitchenStage>) -> ManagerResult<Vec<Order>> {
        let filter = OrderFilter {
            statuses: vec![
                OrderStatus::SentToKitchen,
                OrderStatus::Preparing,
                OrderStatus::Completed,
            ],
            kitchen_stage: stage,
            ..Default::default()
        };
        self.list_orders(&filter)
    }

    pub fn kitchen_stats(&self) -> ManagerResult<KitchenStats> {
        let mut stats = KitchenStats::default();
        for order in self.kitchen_queue(None)? {
            if let Some(stage) = order.kitchen_stage {
                stats.count(stage);
            }
        }
        Ok(stats)
    }

    /// Latest non-terminal order on a table
    pub fn active_order_for_table(&self, table_id: &str) -> ManagerResult<Option<Order>> {
        let filter = OrderFilter {
            table_id: Some(table_id.to_string()),
            ..Default::default()
        };
        Ok(self
            .list_orders(&filter)?
            .into_iter()
            .filter(|o| !o.is_terminal())
            .max_by_key(|o| o.created_at))
    }

    pub fn payments_for_order(&self, order_id: &str) -> ManagerResult<Vec<PaymentRecord>> {
        Ok(self.storage.get_payments_for_order(order_id)?)
    }

    /// Get current sequence number
    pub fn get_current_sequence(&self) -> ManagerResult<u64> {
        Ok(self.storage.get_current_sequence()?)
    }

    /// Get events since a given sequence
    pub fn get_events_since(&self, since_sequence: u64) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_since(since_sequence)?)
    }

    /// Get all events for a specific order
    pub fn get_events_for_order(&self, order_id: &str) -> ManagerResult<Vec<OrderEvent>> {
        Ok(self.storage.get_events_for_order(order_id)?)
    }

    /// Fold the stored events of one order into a fresh snapshot
    pub fn rebuild_order(&self, order_id: &str) -> ManagerResult<Order> {
        let events = self.storage.get_events_for_order(order_id)?;
        if events.is_empty() {
            return Err(ManagerError::OrderNotFound(order_id.to_string()));
        }

        let mut order = Order {
            order_id: order_id.to_string(),
            ..Default::default()
        };
        for event in &events {
            let applier: EventAction = event.into();
            applier.apply(&mut order, event);
        }

        Ok(order)
    }
}

#[cfg(test)]
mod tests;
