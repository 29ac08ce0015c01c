//! In-memory backend with the server's lifecycle and idempotency rules

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use brew_client::{ClientError, ClientResult, OrderBackend};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    LedgerTotals, PaymentRecord, Product, Session, SessionClose, SessionOpen, SessionStatus,
    SessionSummary,
};
use shared::order::{KitchenStage, Order, OrderFilter, OrderStatus, Transition};
use shared::request::{CreateOrderRequest, Operator, PayOrderRequest, TransitionRequest};
use shared::response::{ClosedSession, Settlement};
use shared::util::{new_id, now_millis};
use tokio::sync::Notify;

/// Injected failure for the next call
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Fail before reaching the server
    Unreachable,
    /// Server rejects with this code
    Reject(ErrorCode),
    /// Server applies the command, the response is lost
    LostResponse,
}

#[derive(Default)]
struct State {
    orders: HashMap<String, Order>,
    sessions: HashMap<String, Session>,
    totals: HashMap<String, LedgerTotals>,
    processed: HashMap<String, String>,
    settlements: HashMap<String, Settlement>,
    next_number: u32,
    calls: HashMap<&'static str, u32>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
    faults: Mutex<VecDeque<Fault>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

fn reject(code: ErrorCode, message: impl Into<String>) -> ClientError {
    AppError::with_message(code, message).into()
}

fn lost() -> ClientError {
    ClientError::Timeout(Duration::from_secs(10))
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, fault: Fault) {
        self.faults.lock().push_back(fault);
    }

    /// Hold transition responses until the returned gate is notified
    pub fn hold_transitions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn calls(&self, name: &str) -> u32 {
        self.state.lock().calls.get(name).copied().unwrap_or(0)
    }

    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.state.lock().orders.get(order_id).cloned()
    }

    pub fn totals(&self, session_id: &str) -> LedgerTotals {
        self.state
            .lock()
            .totals
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Another terminal acting on an order
    pub fn apply_elsewhere(&self, order_id: &str, transition: Transition) -> Order {
        let mut state = self.state.lock();
        let order = state.orders.get_mut(order_id).expect("order exists");
        order.apply_transition(transition, now_millis()).expect("valid transition");
        order.clone()
    }

    /// Place an order directly, as if from another register
    pub fn seed_order(&self, session_id: &str, status: OrderStatus) -> Order {
        let mut state = self.state.lock();
        state.next_number += 1;
        let mut order = Order {
            order_id: new_id(),
            order_number: format!("BR{:05}", state.next_number),
            session_id: session_id.to_string(),
            total_amount: Decimal::new(10000, 2),
            created_at: now_millis(),
            ..Default::default()
        };
        let path = [
            Transition::SendToKitchen,
            Transition::BeginPreparing,
            Transition::MarkReady,
        ];
        for transition in path {
            if order.status == status {
                break;
            }
            order.apply_transition(transition, now_millis()).expect("valid path");
        }
        state.orders.insert(order.order_id.clone(), order.clone());
        order
    }

    /// All orders of one session, bypassing fault injection
    pub fn list_orders_for(&self, session_id: &str) -> Vec<Order> {
        self.state
            .lock()
            .orders
            .values()
            .filter(|o| o.session_id == session_id)
            .cloned()
            .collect()
    }

    fn begin(&self, name: &'static str) -> Option<Fault> {
        *self.state.lock().calls.entry(name).or_insert(0) += 1;
        self.faults.lock().pop_front()
    }

    fn precheck(fault: Option<Fault>) -> ClientResult<bool> {
        match fault {
            Some(Fault::Unreachable) => Err(lost()),
            Some(Fault::Reject(code)) => Err(reject(code, "injected")),
            Some(Fault::LostResponse) => Ok(true),
            None => Ok(false),
        }
    }

    fn command_id(operator: &Operator) -> String {
        operator.command_id.clone().unwrap_or_else(new_id)
    }
}

pub fn product(id: &str, paise: i64) -> Product {
    Product {
        id: id.to_string(),
        name: id.to_string(),
        price: Decimal::new(paise, 2),
        tax_percentage: Decimal::ZERO,
        is_active: true,
        category_id: None,
    }
}

#[async_trait]
impl OrderBackend for FakeBackend {
    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        let lose = Self::precheck(self.begin("create_order"))?;
        let mut state = self.state.lock();
        let command_id = Self::command_id(&request.operator);

        let existing = state.processed.get(&command_id).cloned();
        let order = if let Some(order_id) = existing {
            state.orders[&order_id].clone()
        } else {
            request
                .submission
                .validate()
                .map_err(|e| reject(e.code(), e.to_string()))?;
            match state.sessions.get(&request.submission.session_id) {
                Some(s) if s.is_open() => {}
                Some(_) => return Err(reject(ErrorCode::SessionClosed, "session closed")),
                None => return Err(reject(ErrorCode::SessionNotFound, "no session")),
            }
            state.next_number += 1;
            let order_id = new_id();
            let mut order = Order::from_submission(
                order_id.clone(),
                format!("BR{:05}", state.next_number),
                &request.submission,
                now_millis(),
            );
            if !request.draft {
                order
                    .apply_transition(Transition::SendToKitchen, now_millis())
                    .map_err(|e| reject(ErrorCode::InvalidTransition, e.to_string()))?;
            }
            state.orders.insert(order_id.clone(), order.clone());
            state.processed.insert(command_id, order_id);
            order
        };

        if lose { Err(lost()) } else { Ok(order) }
    }

    async fn transition(&self, order_id: &str, request: &TransitionRequest) -> ClientResult<Order> {
        let lose = Self::precheck(self.begin("transition"))?;
        let order = {
            let mut state = self.state.lock();
            let command_id = Self::command_id(&request.operator);
            if state.processed.contains_key(&command_id) {
                state.orders[order_id].clone()
            } else {
                if request.transition == Transition::SettlePayment {
                    return Err(reject(ErrorCode::InvalidRequest, "use the pay endpoint"));
                }
                let order = state
                    .orders
                    .get_mut(order_id)
                    .ok_or_else(|| reject(ErrorCode::OrderNotFound, order_id))?;
                order
                    .apply_transition(request.transition, now_millis())
                    .map_err(|e| reject(ErrorCode::InvalidTransition, e.to_string()))?;
                let order = order.clone();
                state.processed.insert(command_id, order_id.to_string());
                order
            }
        };

        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if lose { Err(lost()) } else { Ok(order) }
    }

    async fn delete_draft(&self, order_id: &str, _operator: &Operator) -> ClientResult<()> {
        Self::precheck(self.begin("delete_draft"))?;
        let mut state = self.state.lock();
        match state.orders.get(order_id) {
            Some(o) if o.status == OrderStatus::Draft => {
                state.orders.remove(order_id);
                Ok(())
            }
            Some(_) => Err(reject(ErrorCode::InvalidTransition, "not a draft")),
            None => Err(reject(ErrorCode::OrderNotFound, order_id)),
        }
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        Self::precheck(self.begin("get_order"))?;
        self.order(order_id)
            .ok_or_else(|| reject(ErrorCode::OrderNotFound, order_id))
    }

    async fn list_orders(&self, filter: &OrderFilter) -> ClientResult<Vec<Order>> {
        Self::precheck(self.begin("list_orders"))?;
        let state = self.state.lock();
        Ok(state
            .orders
            .values()
            .filter(|o| filter.statuses.is_empty() || filter.statuses.contains(&o.status))
            .filter(|o| {
                filter
                    .session_id
                    .as_ref()
                    .is_none_or(|s| &o.session_id == s)
            })
            .cloned()
            .collect())
    }

    async fn kitchen_queue(&self, stage: Option<KitchenStage>) -> ClientResult<Vec<Order>> {
        Self::precheck(self.begin("kitchen_queue"))?;
        let state = self.state.lock();
        Ok(state
            .orders
            .values()
            .filter(|o| o.status.is_in_kitchen())
            .filter(|o| stage.is_none() || o.kitchen_stage == stage)
            .cloned()
            .collect())
    }

    async fn active_order_for_table(&self, table_id: &str) -> ClientResult<Option<Order>> {
        Self::precheck(self.begin("active_order_for_table"))?;
        let state = self.state.lock();
        Ok(state
            .orders
            .values()
            .find(|o| o.table_id.as_deref() == Some(table_id) && !o.is_terminal())
            .cloned())
    }

    async fn pay(&self, order_id: &str, request: &PayOrderRequest) -> ClientResult<Settlement> {
        let lose = Self::precheck(self.begin("pay"))?;
        let mut state = self.state.lock();
        let command_id = Self::command_id(&request.operator);

        let settlement = if state.processed.contains_key(&command_id) {
            let mut settlement = state.settlements[order_id].clone();
            settlement.duplicate = true;
            settlement
        } else {
            let mut order = state
                .orders
                .get(order_id)
                .cloned()
                .ok_or_else(|| reject(ErrorCode::OrderNotFound, order_id))?;
            if order.status == OrderStatus::Paid {
                return Err(reject(ErrorCode::OrderAlreadyPaid, order_id));
            }
            if request.payment.amount != order.total_amount {
                return Err(reject(ErrorCode::PaymentAmountMismatch, "amount mismatch"));
            }
            order
                .apply_transition(Transition::SettlePayment, now_millis())
                .map_err(|e| reject(ErrorCode::InvalidTransition, e.to_string()))?;
            let payment = PaymentRecord {
                payment_id: new_id(),
                order_id: order_id.to_string(),
                session_id: order.session_id.clone(),
                method: request.payment.method,
                amount: request.payment.amount,
                reference: request.payment.reference.clone(),
                operator_id: request.operator.operator_id.clone(),
                created_at: now_millis(),
            };
            order.payment_id = Some(payment.payment_id.clone());
            state
                .totals
                .entry(order.session_id.clone())
                .or_default()
                .record(payment.method, payment.amount);
            let settlement = Settlement {
                order: order.clone(),
                payment,
                duplicate: false,
            };
            state.orders.insert(order_id.to_string(), order);
            state.settlements.insert(order_id.to_string(), settlement.clone());
            state.processed.insert(command_id, order_id.to_string());
            settlement
        };

        if lose { Err(lost()) } else { Ok(settlement) }
    }

    async fn open_session(&self, request: &SessionOpen) -> ClientResult<Session> {
        Self::precheck(self.begin("open_session"))?;
        let mut state = self.state.lock();
        let conflict = state.sessions.values().any(|s| {
            s.is_open() && s.terminal_id == request.terminal_id && s.user_id == request.user_id
        });
        if conflict {
            return Err(reject(ErrorCode::SessionConflict, "session already open"));
        }
        let session = Session {
            session_id: new_id(),
            terminal_id: request.terminal_id.clone(),
            terminal_name: request.terminal_name.clone(),
            user_id: request.user_id.clone(),
            user_name: request.user_name.clone(),
            opening_balance: request.opening_balance,
            closing_balance: None,
            opened_at: now_millis(),
            closed_at: None,
            status: SessionStatus::Open,
            note: None,
        };
        state.sessions.insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    async fn close_session(
        &self,
        session_id: &str,
        request: &SessionClose,
    ) -> ClientResult<ClosedSession> {
        Self::precheck(self.begin("close_session"))?;
        let mut state = self.state.lock();
        let totals = state.totals.get(session_id).cloned().unwrap_or_default();
        let session = state
            .sessions
            .get_mut(session_id)
            .ok_or_else(|| reject(ErrorCode::SessionNotFound, session_id))?;
        if !session.is_open() {
            return Err(reject(ErrorCode::SessionClosed, session_id));
        }
        session.status = SessionStatus::Closed;
        session.closing_balance = Some(request.closing_balance);
        session.closed_at = Some(now_millis());
        session.note = request.note.clone();
        Ok(ClosedSession {
            summary: SessionSummary::build(session, &totals),
            session: session.clone(),
        })
    }

    async fn active_session(
        &self,
        terminal_id: &str,
        user_id: &str,
    ) -> ClientResult<Option<Session>> {
        Self::precheck(self.begin("active_session"))?;
        let state = self.state.lock();
        Ok(state
            .sessions
            .values()
            .find(|s| s.is_open() && s.terminal_id == terminal_id && s.user_id == user_id)
            .cloned())
    }
}
