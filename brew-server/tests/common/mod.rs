#![allow(dead_code)]

use brew_server::{Config, ServerState};
use rust_decimal::Decimal;
use shared::models::{Session, SessionOpen};
use shared::order::{CartSubmission, SubmittedLine};
use tempfile::TempDir;

/// Server state over a fresh on-disk database; keep the dir alive
pub fn test_state() -> (TempDir, ServerState) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::with_overrides(dir.path().to_string_lossy(), 0);
    let state = ServerState::initialize(&config).unwrap();
    (dir, state)
}

pub fn open_session(state: &ServerState, terminal_id: &str, user_id: &str) -> Session {
    state
        .ledger()
        .open(SessionOpen {
            terminal_id: terminal_id.to_string(),
            terminal_name: format!("Register {terminal_id}"),
            user_id: user_id.to_string(),
            user_name: format!("Cashier {user_id}"),
            opening_balance: Decimal::new(100000, 2),
        })
        .unwrap()
}

/// One line per `(quantity, price in paise, tax percent)`
pub fn submission(session_id: &str, lines: &[(i32, i64, i64)]) -> CartSubmission {
    CartSubmission {
        session_id: session_id.to_string(),
        table_id: None,
        table_name: None,
        customer_id: None,
        customer_name: None,
        note: None,
        lines: lines
            .iter()
            .enumerate()
            .map(|(i, (quantity, price, tax))| SubmittedLine {
                product_id: format!("p-{i}"),
                name: format!("Item {i}"),
                quantity: *quantity,
                unit_price: Decimal::new(*price, 2),
                discount_percent: Decimal::ZERO,
                tax_percent: Decimal::from(*tax),
                note: String::new(),
            })
            .collect(),
    }
}
