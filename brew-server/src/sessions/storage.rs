//! redb tables for register sessions
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `sessions` | `session_id` | `Session` | Session records |
//! | `open_sessions` | `"terminal_id\|user_id"` | `session_id` | At most one open session per pair |
//! | `session_ledgers` | `session_id` | `LedgerTotals` | Running counters |
//! | `ledger_entries` | `(session_id, order_id)` | `LedgerEntry` | Orders already counted |
//! | `session_summaries` | `session_id` | `SessionSummary` | Frozen at close |

use crate::orders::storage::StorageResult;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{LedgerTotals, PaymentMethod, Session, SessionSummary};
use std::sync::Arc;

const SESSIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

const OPEN_SESSIONS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("open_sessions");

const SESSION_LEDGERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("session_ledgers");

const LEDGER_ENTRIES_TABLE: TableDefinition<(&str, &str), &[u8]> =
    TableDefinition::new("ledger_entries");

const SESSION_SUMMARIES_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("session_summaries");

/// One paid order counted into a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub order_id: String,
    pub payment_id: String,
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub recorded_at: i64,
}

/// Key of the open-session index
pub fn open_key(terminal_id: &str, user_id: &str) -> String {
    format!("{terminal_id}|{user_id}")
}

#[derive(Clone)]
pub struct SessionStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for SessionStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStorage").finish_non_exhaustive()
    }
}

impl SessionStorage {
    /// Create the session tables in an already opened database
    pub fn new(db: Arc<Database>) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SESSIONS_TABLE)?;
            let _ = write_txn.open_table(OPEN_SESSIONS_TABLE)?;
            let _ = write_txn.open_table(SESSION_LEDGERS_TABLE)?;
            let _ = write_txn.open_table(LEDGER_ENTRIES_TABLE)?;
            let _ = write_txn.open_table(SESSION_SUMMARIES_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db })
    }

    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Sessions ==========

    pub fn store_session(&self, txn: &WriteTransaction, session: &Session) -> StorageResult<()> {
        let mut table = txn.open_table(SESSIONS_TABLE)?;
        let value = serde_json::to_vec(session)?;
        table.insert(session.session_id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_session(&self, session_id: &str) -> StorageResult<Option<Session>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS_TABLE)?;
        match table.get(session_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    pub fn get_session_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
    ) -> StorageResult<Option<Session>> {
        let table = txn.open_table(SESSIONS_TABLE)?;
        match table.get(session_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// All sessions, most recently opened first
    pub fn list_sessions(&self) -> StorageResult<Vec<Session>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS_TABLE)?;
        let mut sessions: Vec<Session> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            sessions.push(serde_json::from_slice(value.value())?);
        }
        sessions.sort_by(|a, b| b.opened_at.cmp(&a.opened_at));
        Ok(sessions)
    }

    // ========== Open Session Index ==========

    pub fn find_open_txn(&self, txn: &WriteTransaction, key: &str) -> StorageResult<Option<String>> {
        let table = txn.open_table(OPEN_SESSIONS_TABLE)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    pub fn set_open(&self, txn: &WriteTransaction, key: &str, session_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_SESSIONS_TABLE)?;
        table.insert(key, session_id)?;
        Ok(())
    }

    pub fn clear_open(&self, txn: &WriteTransaction, key: &str) -> StorageResult<()> {
        let mut table = txn.open_table(OPEN_SESSIONS_TABLE)?;
        table.remove(key)?;
        Ok(())
    }

    /// Open session ids matching the terminal and/or user
    pub fn find_open(
        &self,
        terminal_id: Option<&str>,
        user_id: Option<&str>,
    ) -> StorageResult<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(OPEN_SESSIONS_TABLE)?;
        let mut ids = Vec::new();
        for result in table.iter()? {
            let (key, value) = result?;
            let key = key.value();
            let (terminal, user) = key.split_once('|').unwrap_or((key, ""));
            if terminal_id.is_some_and(|t| t != terminal) || user_id.is_some_and(|u| u != user) {
                continue;
            }
            ids.push(value.value().to_string());
        }
        Ok(ids)
    }

    // ========== Ledger ==========

    pub fn get_totals(&self, session_id: &str) -> StorageResult<LedgerTotals> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSION_LEDGERS_TABLE)?;
        match table.get(session_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(LedgerTotals::default()),
        }
    }

    pub fn get_totals_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
    ) -> StorageResult<LedgerTotals> {
        let table = txn.open_table(SESSION_LEDGERS_TABLE)?;
        match table.get(session_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Ok(LedgerTotals::default()),
        }
    }

    pub fn store_totals(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        totals: &LedgerTotals,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SESSION_LEDGERS_TABLE)?;
        let value = serde_json::to_vec(totals)?;
        table.insert(session_id, value.as_slice())?;
        Ok(())
    }

    pub fn has_entry_txn(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        order_id: &str,
    ) -> StorageResult<bool> {
        let table = txn.open_table(LEDGER_ENTRIES_TABLE)?;
        Ok(table.get((session_id, order_id))?.is_some())
    }

    pub fn store_entry(
        &self,
        txn: &WriteTransaction,
        session_id: &str,
        entry: &LedgerEntry,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(LEDGER_ENTRIES_TABLE)?;
        let value = serde_json::to_vec(entry)?;
        table.insert((session_id, entry.order_id.as_str()), value.as_slice())?;
        Ok(())
    }

    // ========== Summaries ==========

    pub fn store_summary(
        &self,
        txn: &WriteTransaction,
        summary: &SessionSummary,
    ) -> StorageResult<()> {
        let mut table = txn.open_table(SESSION_SUMMARIES_TABLE)?;
        let value = serde_json::to_vec(summary)?;
        table.insert(summary.session_id.as_str(), value.as_slice())?;
        Ok(())
    }

    pub fn get_summary(&self, session_id: &str) -> StorageResult<Option<SessionSummary>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSION_SUMMARIES_TABLE)?;
        match table.get(session_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}
