//! Register Session Model
//!
//! A session is one cash-drawer shift on one terminal for one user. Paid orders
//! are folded into its [`LedgerTotals`]; closing it freezes the totals into a
//! [`SessionSummary`].

use super::payment::PaymentMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Open,
    Closed,
}

/// Register session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub terminal_id: String,
    pub terminal_name: String,
    pub user_id: String,
    pub user_name: String,
    pub opening_balance: Decimal,
    /// Counted cash at close, null while open
    pub closing_balance: Option<Decimal>,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Session {
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

/// Open session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOpen {
    pub terminal_id: String,
    #[serde(default)]
    pub terminal_name: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub opening_balance: Decimal,
}

/// Close session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClose {
    pub closing_balance: Decimal,
    #[serde(default)]
    pub note: Option<String>,
}

/// Count and amount for one payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodTotals {
    pub orders: u32,
    pub total: Decimal,
}

/// Running counters of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub total_orders: u32,
    pub total_sales: Decimal,
    pub by_method: BTreeMap<PaymentMethod, MethodTotals>,
}

impl Default for LedgerTotals {
    fn default() -> Self {
        Self {
            total_orders: 0,
            total_sales: Decimal::ZERO,
            by_method: PaymentMethod::ALL
                .iter()
                .map(|m| (*m, MethodTotals::default()))
                .collect(),
        }
    }
}

impl LedgerTotals {
    /// Fold one settled order into the counters
    pub fn record(&mut self, method: PaymentMethod, amount: Decimal) {
        self.total_orders += 1;
        self.total_sales += amount;
        let entry = self.by_method.entry(method).or_default();
        entry.orders += 1;
        entry.total += amount;
    }

    pub fn method(&self, method: PaymentMethod) -> MethodTotals {
        self.by_method.get(&method).copied().unwrap_or_default()
    }
}

/// Session report: live projection while open, frozen once closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub status: SessionStatus,
    pub terminal_id: String,
    pub terminal_name: String,
    pub user_id: String,
    pub user_name: String,
    pub opening_balance: Decimal,
    pub closing_balance: Option<Decimal>,
    pub opened_at: i64,
    pub closed_at: Option<i64>,
    pub total_orders: u32,
    pub total_sales: Decimal,
    pub by_method: BTreeMap<PaymentMethod, MethodTotals>,
    /// Opening balance plus cash sales
    pub expected_cash: Decimal,
    /// Closing balance minus expected cash, once closed
    pub cash_variance: Option<Decimal>,
}

impl SessionSummary {
    pub fn build(session: &Session, totals: &LedgerTotals) -> Self {
        let expected_cash = session.opening_balance + totals.method(PaymentMethod::Cash).total;
        Self {
            session_id: session.session_id.clone(),
            status: session.status,
            terminal_id: session.terminal_id.clone(),
            terminal_name: session.terminal_name.clone(),
            user_id: session.user_id.clone(),
            user_name: session.user_name.clone(),
            opening_balance: session.opening_balance,
            closing_balance: session.closing_balance,
            opened_at: session.opened_at,
            closed_at: session.closed_at,
            total_orders: totals.total_orders,
            total_sales: totals.total_sales,
            by_method: totals.by_method.clone(),
            expected_cash,
            cash_variance: session.closing_balance.map(|c| c - expected_cash),
        }
    }

    pub fn method(&self, method: PaymentMethod) -> MethodTotals {
        self.by_method.get(&method).copied().unwrap_or_default()
    }
}
