//! Session ledger service
//!
//! A session is opened once per terminal and user, accumulates paid orders
//! into running counters, and is closed exactly once. Counters are updated
//! inside redb write transactions, which serializes concurrent settlements.

use super::storage::{LedgerEntry, SessionStorage, open_key};
use super::{LedgerError, LedgerResult};
use crate::orders::storage::StorageError;
use redb::WriteTransaction;
use shared::models::{
    PaymentRecord, Session, SessionClose, SessionOpen, SessionStatus, SessionSummary,
};
use shared::order::{Order, OrderStatus};

#[derive(Debug, Clone)]
pub struct SessionLedger {
    storage: SessionStorage,
}

impl SessionLedger {
    pub fn new(storage: SessionStorage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &SessionStorage {
        &self.storage
    }

    /// Open a session. Fails with `SessionConflict` while the same terminal and
    /// user still have one open.
    pub fn open(&self, request: SessionOpen) -> LedgerResult<Session> {
        let key = open_key(&request.terminal_id, &request.user_id);
        let txn = self.storage.begin_write()?;

        if let Some(existing) = self.storage.find_open_txn(&txn, &key)? {
            tracing::warn!(
                terminal_id = %request.terminal_id,
                user_id = %request.user_id,
                session_id = %existing,
                "Session already open"
            );
            return Err(LedgerError::SessionConflict {
                terminal_id: request.terminal_id,
                user_id: request.user_id,
                session_id: existing,
            });
        }

        let session = Session {
            session_id: shared::util::new_id(),
            terminal_id: request.terminal_id,
            terminal_name: request.terminal_name,
            user_id: request.user_id,
            user_name: request.user_name,
            opening_balance: shared::money::round_money(request.opening_balance),
            closing_balance: None,
            opened_at: shared::util::now_millis(),
            closed_at: None,
            status: SessionStatus::Open,
            note: None,
        };
        self.storage.store_session(&txn, &session)?;
        self.storage.set_open(&txn, &key, &session.session_id)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            session_id = %session.session_id,
            terminal_id = %session.terminal_id,
            user_id = %session.user_id,
            opening_balance = %session.opening_balance,
            "Session opened"
        );
        Ok(session)
    }

    /// Fold a paid order into its session inside the caller's transaction.
    ///
    /// Returns `Ok(false)` when the order was already counted.
    pub fn record_order_txn(
        &self,
        txn: &WriteTransaction,
        order: &Order,
        payment: &PaymentRecord,
    ) -> LedgerResult<bool> {
        if order.status != OrderStatus::Paid {
            return Err(LedgerError::OrderNotPaid(order.order_id.clone()));
        }
        if payment.session_id != order.session_id {
            return Err(LedgerError::SessionMismatch {
                order_id: order.order_id.clone(),
                expected: order.session_id.clone(),
                actual: payment.session_id.clone(),
            });
        }
        let session = self
            .storage
            .get_session_txn(txn, &order.session_id)?
            .ok_or_else(|| LedgerError::SessionNotFound(order.session_id.clone()))?;
        if !session.is_open() {
            return Err(LedgerError::SessionClosed(session.session_id));
        }
        if self
            .storage
            .has_entry_txn(txn, &session.session_id, &order.order_id)?
        {
            return Ok(false);
        }

        let mut totals = self.storage.get_totals_txn(txn, &session.session_id)?;
        totals.record(payment.method, payment.amount);
        self.storage
            .store_totals(txn, &session.session_id, &totals)?;
        self.storage.store_entry(
            txn,
            &session.session_id,
            &LedgerEntry {
                order_id: order.order_id.clone(),
                payment_id: payment.payment_id.clone(),
                method: payment.method,
                amount: payment.amount,
                recorded_at: shared::util::now_millis(),
            },
        )?;
        Ok(true)
    }

    /// Record a paid order in its own transaction
    pub fn record_order(&self, order: &Order, payment: &PaymentRecord) -> LedgerResult<bool> {
        let txn = self.storage.begin_write()?;
        let recorded = self.record_order_txn(&txn, order, payment)?;
        txn.commit().map_err(StorageError::from)?;
        Ok(recorded)
    }

    /// Close a session and freeze its summary. A session closes exactly once.
    pub fn close(&self, session_id: &str, request: SessionClose) -> LedgerResult<SessionSummary> {
        let txn = self.storage.begin_write()?;
        let mut session = self
            .storage
            .get_session_txn(&txn, session_id)?
            .ok_or_else(|| LedgerError::SessionNotFound(session_id.to_string()))?;
        if !session.is_open() {
            return Err(LedgerError::SessionClosed(session_id.to_string()));
        }

        session.status = SessionStatus::Closed;
        session.closing_balance = Some(shared::money::round_money(request.closing_balance));
        session.closed_at = Some(shared::util::now_millis());
        session.note = request.note;

        let totals = self.storage.get_totals_txn(&txn, session_id)?;
        let summary = SessionSummary::build(&session, &totals);

        self.storage.store_session(&txn, &session)?;
        self.storage
            .clear_open(&txn, &open_key(&session.terminal_id, &session.user_id))?;
        self.storage.store_summary(&txn, &summary)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(
            session_id = %session_id,
            total_orders = summary.total_orders,
            total_sales = %summary.total_sales,
            cash_variance = ?summary.cash_variance,
            "Session closed"
        );
        Ok(summary)
    }

    pub fn get(&self, session_id: &str) -> LedgerResult<Option<Session>> {
        Ok(self.storage.get_session(session_id)?)
    }

    /// Open session for a terminal and/or user, if any
    pub fn get_active(
        &self,
        terminal_id: Option<&str>,
        user_id: Option<&str>,
    ) -> LedgerResult<Option<Session>> {
        for session_id in self.storage.find_open(terminal_id, user_id)? {
            if let Some(session) = self.storage.get_session(&session_id)?
                && session.is_open()
            {
                return Ok(Some(session));
            }
        }
        Ok(None)
    }

    /// Live projection while open, the frozen summary once closed
    pub fn summary(&self, session_id: &str) -> LedgerResult<SessionSummary> {
        if let Some(frozen) = self.storage.get_summary(session_id)? {
            return Ok(frozen);
        }
        let session = self
            .storage
            .get_session(session_id)?
            .ok_or_else(|| LedgerError::SessionNotFound(session_id.to_string()))?;
        let totals = self.storage.get_totals(session_id)?;
        Ok(SessionSummary::build(&session, &totals))
    }

    /// Most recent sessions first
    pub fn history(&self, limit: usize) -> LedgerResult<Vec<Session>> {
        let mut sessions = self.storage.list_sessions()?;
        sessions.truncate(limit);
        Ok(sessions)
    }
}
