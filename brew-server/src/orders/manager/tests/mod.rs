use super::*;
use rust_decimal::Decimal;
use shared::error::ErrorCode;
use shared::models::{PaymentMethod, PaymentRequest, Session, SessionOpen};
use shared::order::{CartSubmission, SubmittedLine, Transition};


fn create_test_manager() -> OrdersManager {
    let storage = OrderStorage::open_in_memory().unwrap();
    OrdersManager::with_storage(storage).unwrap()
}

fn open_session(manager: &OrdersManager, terminal_id: &str) -> Session {
    manager
        .ledger()
        .open(SessionOpen {
            terminal_id: terminal_id.to_string(),
            terminal_name: format!("Terminal {terminal_id}"),
            user_id: "u-1".to_string(),
            user_name: "Asha".to_string(),
            opening_balance: Decimal::new(50000, 2),
        })
        .unwrap()
}

/// One line per `(quantity, price in paise, tax percent)`
fn submission(session_id: &str, table_id: Option<&str>, lines: &[(i32, i64, i64)]) -> CartSubmission {
    CartSubmission {
        session_id: session_id.to_string(),
        table_id: table_id.map(str::to_string),
        table_name: table_id.map(|t| format!("Table {t}")),
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

fn command(payload: OrderCommandPayload) -> OrderCommand {
    OrderCommand::new("u-1", "Asha", payload)
}

/// Place an order straight into the kitchen and return its id
fn place_order(manager: &OrdersManager, session_id: &str, lines: &[(i32, i64, i64)]) -> String {
    let resp = manager.execute_command(command(OrderCommandPayload::PlaceOrder {
        submission: submission(session_id, None, lines),
    }));
    assert!(resp.success, "Failed to place order: {:?}", resp.error);
    resp.order_id.unwrap()
}

fn transition(manager: &OrdersManager, order_id: &str, transition: Transition) -> CommandResponse {
    manager.execute_command(command(OrderCommandPayload::Transition {
        order_id: order_id.to_string(),
        transition,
        reason: None,
    }))
}

fn pay(manager: &OrdersManager, order_id: &str, method: PaymentMethod, cents: i64) -> CommandResponse {
    manager.execute_command(command(OrderCommandPayload::SettlePayment {
        order_id: order_id.to_string(),
        payment: PaymentRequest {
            method,
            amount: Decimal::new(cents, 2),
            reference: None,
        },
    }))
}

fn status_of(manager: &OrdersManager, order_id: &str) -> OrderStatus {
    manager.get_order(order_id).unwrap().unwrap().status
}

fn error_code(resp: &CommandResponse) -> ErrorCode {
    resp.error.as_ref().map(|e| e.code).unwrap_or(ErrorCode::Success)
}
