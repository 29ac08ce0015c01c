//! Register screen workflow: session, cart, submission and payment
//!
//! Submissions and payments are never retried automatically. When one fails
//! with a transient error the outcome on the server is unknown, so the
//! command id is kept: if the operator retries the same cart or the same
//! payment, the server recognizes the command and answers with the original
//! result instead of applying it twice.

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use shared::cart::Cart;
use shared::error::ErrorKind;
use shared::models::{PaymentRequest, Session, SessionClose, SessionOpen};
use shared::order::{CartSubmission, Order, Transition};
use shared::request::{CreateOrderRequest, PayOrderRequest, TransitionRequest};
use shared::response::{ClosedSession, Settlement};
use shared::util::new_id;

use crate::{ClientConfig, ClientError, ClientResult, OrderBackend};

/// Command id of a request whose outcome is unknown
#[derive(Debug, Clone)]
struct Pending<T> {
    command_id: String,
    request: T,
}

/// Reuse the pending command id for an identical request
fn command_id_for<T: PartialEq>(pending: Option<&Pending<T>>, request: &T) -> String {
    match pending {
        Some(p) if &p.request == request => p.command_id.clone(),
        _ => new_id(),
    }
}

pub struct Register<B> {
    backend: Arc<B>,
    config: ClientConfig,
    cart: Cart,
    session: Option<Session>,
    pending_submit: Option<Pending<(CartSubmission, bool)>>,
    pending_payments: HashMap<String, Pending<PaymentRequest>>,
}

impl<B: OrderBackend> Register<B> {
    pub fn new(backend: Arc<B>, config: ClientConfig) -> Self {
        Self {
            backend,
            config,
            cart: Cart::new(),
            session: None,
            pending_submit: None,
            pending_payments: HashMap::new(),
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn open_session_id(&self) -> ClientResult<String> {
        self.session
            .as_ref()
            .filter(|s| s.is_open())
            .map(|s| s.session_id.clone())
            .ok_or(ClientError::NoSession)
    }

    /// Drop local session state when the server says it is closed
    fn note_failure(&mut self, err: &ClientError) {
        if err.kind() == ErrorKind::SessionClosed {
            tracing::warn!("Session closed on server, clearing local session");
            self.session = None;
        }
    }

    /// Pick up this terminal's open session after a restart
    pub async fn resume_session(&mut self) -> ClientResult<Option<Session>> {
        let session = self
            .backend
            .active_session(&self.config.terminal_id, &self.config.user_id)
            .await?;
        self.session = session.clone();
        Ok(session)
    }

    pub async fn open_session(&mut self, opening_balance: Decimal) -> ClientResult<Session> {
        let request = SessionOpen {
            terminal_id: self.config.terminal_id.clone(),
            terminal_name: self.config.terminal_name.clone(),
            user_id: self.config.user_id.clone(),
            user_name: self.config.user_name.clone(),
            opening_balance,
        };
        let session = self.backend.open_session(&request).await?;
        tracing::info!(session_id = %session.session_id, %opening_balance, "Session opened");
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Submit the cart and send it to the kitchen
    pub async fn place_order(&mut self) -> ClientResult<Order> {
        self.submit(false).await
    }

    /// Submit the cart as a draft
    pub async fn save_draft(&mut self) -> ClientResult<Order> {
        self.submit(true).await
    }

    async fn submit(&mut self, draft: bool) -> ClientResult<Order> {
        let session_id = self.open_session_id()?;
        let submission = self.cart.to_submission(&session_id)?;
        let key = (submission, draft);
        let command_id = command_id_for(self.pending_submit.as_ref(), &key);

        let request = CreateOrderRequest {
            operator: self.config.operator().with_command_id(command_id.clone()),
            submission: key.0.clone(),
            draft,
        };
        self.pending_submit = Some(Pending {
            command_id,
            request: key,
        });

        match self.backend.create_order(&request).await {
            Ok(order) => {
                self.pending_submit = None;
                self.cart.clear();
                tracing::info!(
                    order_id = %order.order_id,
                    order_number = %order.order_number,
                    total = %order.total_amount,
                    draft,
                    "Order submitted"
                );
                Ok(order)
            }
            Err(err) => {
                // cart is kept so the operator can retry or edit
                if !err.is_transient() {
                    self.pending_submit = None;
                }
                self.note_failure(&err);
                Err(err)
            }
        }
    }

    /// Send a saved draft to the kitchen
    pub async fn send_draft(&mut self, order_id: &str) -> ClientResult<Order> {
        let request = TransitionRequest {
            operator: self.config.operator().with_command_id(new_id()),
            transition: Transition::SendToKitchen,
            reason: None,
        };
        self.backend.transition(order_id, &request).await
    }

    pub async fn delete_draft(&mut self, order_id: &str) -> ClientResult<()> {
        let operator = self.config.operator().with_command_id(new_id());
        self.backend.delete_draft(order_id, &operator).await
    }

    /// Settle an order in full
    pub async fn pay(&mut self, order_id: &str, payment: PaymentRequest) -> ClientResult<Settlement> {
        let command_id = command_id_for(self.pending_payments.get(order_id), &payment);
        let request = PayOrderRequest {
            operator: self.config.operator().with_command_id(command_id.clone()),
            payment: payment.clone(),
        };
        self.pending_payments.insert(
            order_id.to_string(),
            Pending {
                command_id,
                request: payment,
            },
        );

        match self.backend.pay(order_id, &request).await {
            Ok(settlement) => {
                self.pending_payments.remove(order_id);
                tracing::info!(
                    order_id,
                    payment_id = %settlement.payment.payment_id,
                    method = %settlement.payment.method,
                    amount = %settlement.payment.amount,
                    duplicate = settlement.duplicate,
                    "Order settled"
                );
                Ok(settlement)
            }
            Err(err) => {
                if !err.is_transient() {
                    self.pending_payments.remove(order_id);
                }
                self.note_failure(&err);
                Err(err)
            }
        }
    }

    /// Whether a payment for this order has an unknown outcome
    pub fn has_pending_payment(&self, order_id: &str) -> bool {
        self.pending_payments.contains_key(order_id)
    }

    pub async fn close_session(
        &mut self,
        closing_balance: Decimal,
        note: Option<String>,
    ) -> ClientResult<ClosedSession> {
        let session_id = self.open_session_id()?;
        let request = SessionClose {
            closing_balance,
            note,
        };
        match self.backend.close_session(&session_id, &request).await {
            Ok(closed) => {
                tracing::info!(
                    session_id = %session_id,
                    variance = ?closed.summary.cash_variance,
                    "Session closed"
                );
                self.session = None;
                self.pending_payments.clear();
                Ok(closed)
            }
            Err(err) => {
                self.note_failure(&err);
                Err(err)
            }
        }
    }
}
