//! HTTP backend for the brew server API

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorBody};
use shared::models::{Session, SessionClose, SessionOpen};
use shared::order::{KitchenStage, Order, OrderFilter};
use shared::request::{CreateOrderRequest, Operator, PayOrderRequest, TransitionRequest};
use shared::response::{ClosedSession, HealthResponse, PaymentMethods, Settlement, UpiLink};

use crate::{ClientConfig, ClientError, ClientResult, OrderBackend};

/// HTTP client for one brew server
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::handle_response(response).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<T> {
        let response = self.client.get(self.url(path)).query(query).send().await?;
        Self::handle_response(response).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::handle_response(response).await
    }

    /// Decode a success body, or rebuild the server's error envelope
    async fn handle_response<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorBody>(&bytes) {
                Ok(body) => AppError::from(body).into(),
                Err(_) => ClientError::InvalidResponse(format!(
                    "HTTP {}: {}",
                    status,
                    String::from_utf8_lossy(&bytes)
                )),
            });
        }

        serde_json::from_slice(&bytes).map_err(Into::into)
    }

    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.get("/health").await
    }

    pub async fn payment_methods(&self) -> ClientResult<PaymentMethods> {
        self.get("/api/payments/methods").await
    }

    pub async fn upi_link(&self, order_id: &str) -> ClientResult<UpiLink> {
        self.get(&format!("/api/orders/{order_id}/upi-link")).await
    }
}

/// Query pairs understood by `GET /api/orders`
fn filter_query(filter: &OrderFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if !filter.statuses.is_empty() {
        let statuses: Vec<&str> = filter.statuses.iter().map(|s| s.as_str()).collect();
        query.push(("status", statuses.join(",")));
    }
    if let Some(session_id) = &filter.session_id {
        query.push(("session_id", session_id.clone()));
    }
    if let Some(stage) = filter.kitchen_stage {
        query.push(("kitchen_stage", stage.as_str().to_string()));
    }
    if let Some(table_id) = &filter.table_id {
        query.push(("table_id", table_id.clone()));
    }
    query
}

#[async_trait]
impl OrderBackend for HttpBackend {
    async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        self.post("/api/orders", request).await
    }

    async fn transition(&self, order_id: &str, request: &TransitionRequest) -> ClientResult<Order> {
        self.post(&format!("/api/orders/{order_id}/transition"), request)
            .await
    }

    async fn delete_draft(&self, order_id: &str, operator: &Operator) -> ClientResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/api/orders/{order_id}")))
            .query(operator)
            .send()
            .await?;
        Self::handle_response::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.get(&format!("/api/orders/{order_id}")).await
    }

    async fn list_orders(&self, filter: &OrderFilter) -> ClientResult<Vec<Order>> {
        self.get_with_query("/api/orders", &filter_query(filter))
            .await
    }

    async fn kitchen_queue(&self, stage: Option<KitchenStage>) -> ClientResult<Vec<Order>> {
        match stage {
            Some(stage) => {
                self.get_with_query("/api/kitchen/orders", &[("stage", stage.as_str())])
                    .await
            }
            None => self.get("/api/kitchen/orders").await,
        }
    }

    async fn active_order_for_table(&self, table_id: &str) -> ClientResult<Option<Order>> {
        self.get(&format!("/api/tables/{table_id}/active-order"))
            .await
    }

    async fn pay(&self, order_id: &str, request: &PayOrderRequest) -> ClientResult<Settlement> {
        self.post(&format!("/api/orders/{order_id}/pay"), request)
            .await
    }

    async fn open_session(&self, request: &SessionOpen) -> ClientResult<Session> {
        self.post("/api/sessions", request).await
    }

    async fn close_session(
        &self,
        session_id: &str,
        request: &SessionClose,
    ) -> ClientResult<ClosedSession> {
        self.post(&format!("/api/sessions/{session_id}/close"), request)
            .await
    }

    async fn active_session(
        &self,
        terminal_id: &str,
        user_id: &str,
    ) -> ClientResult<Option<Session>> {
        self.get_with_query(
            "/api/sessions/active",
            &[("terminal_id", terminal_id), ("user_id", user_id)],
        )
        .await
    }
}
