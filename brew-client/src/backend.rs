//! Server operations the terminal depends on
//!
//! [`crate::HttpBackend`] is the production implementation; tests drive the
//! sync engine and register against in-process fakes.

use async_trait::async_trait;
use shared::models::{Session, SessionClose, SessionOpen};
use shared::order::{KitchenStage, Order, OrderFilter};
use shared::request::{CreateOrderRequest, Operator, PayOrderRequest, TransitionRequest};
use shared::response::{ClosedSession, Settlement};

use crate::ClientResult;

#[async_trait]
pub trait OrderBackend: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order>;

    async fn transition(&self, order_id: &str, request: &TransitionRequest) -> ClientResult<Order>;

    async fn delete_draft(&self, order_id: &str, operator: &Operator) -> ClientResult<()>;

    async fn get_order(&self, order_id: &str) -> ClientResult<Order>;

    async fn list_orders(&self, filter: &OrderFilter) -> ClientResult<Vec<Order>>;

    async fn kitchen_queue(&self, stage: Option<KitchenStage>) -> ClientResult<Vec<Order>>;

    async fn active_order_for_table(&self, table_id: &str) -> ClientResult<Option<Order>>;

    async fn pay(&self, order_id: &str, request: &PayOrderRequest) -> ClientResult<Settlement>;

    async fn open_session(&self, request: &SessionOpen) -> ClientResult<Session>;

    async fn close_session(
        &self,
        session_id: &str,
        request: &SessionClose,
    ) -> ClientResult<ClosedSession>;

    async fn active_session(&self, terminal_id: &str, user_id: &str)
    -> ClientResult<Option<Session>>;
}
