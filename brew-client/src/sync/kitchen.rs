//! Kitchen display actions with optimistic updates
//!
//! Each action claims its order, updates the local view provisionally, then
//! sends the transition. The server's answer is merged on success; on
//! failure the provisional state is rolled back and, for conflicts, the
//! order is re-read. A caller that stops waiting does not abandon the
//! request.

use std::sync::Arc;

use shared::order::{Order, Transition};
use shared::request::{Operator, TransitionRequest};
use shared::util::{new_id, now_millis};

use super::inflight::InFlight;
use super::optimistic::PendingAction;
use super::view::{Merge, OrderView};
use crate::{ClientError, ClientResult, OrderBackend};

pub struct KitchenSync<B> {
    backend: Arc<B>,
    view: Arc<OrderView>,
    inflight: InFlight,
    operator: Operator,
}

impl<B: OrderBackend + 'static> KitchenSync<B> {
    pub fn new(backend: Arc<B>, view: Arc<OrderView>, operator: Operator) -> Self {
        Self {
            backend,
            view,
            inflight: InFlight::new(),
            operator,
        }
    }

    pub fn view(&self) -> &Arc<OrderView> {
        &self.view
    }

    /// Whether an action on this order is awaiting its response
    pub fn is_busy(&self, order_id: &str) -> bool {
        self.inflight.is_busy(order_id)
    }

    pub async fn begin_preparing(&self, order_id: &str) -> ClientResult<Order> {
        self.advance(order_id, Transition::BeginPreparing, None).await
    }

    pub async fn mark_ready(&self, order_id: &str) -> ClientResult<Order> {
        self.advance(order_id, Transition::MarkReady, None).await
    }

    pub async fn cancel(&self, order_id: &str, reason: Option<String>) -> ClientResult<Order> {
        self.advance(order_id, Transition::Cancel, reason).await
    }

    /// Apply `transition` locally, then on the server.
    ///
    /// The request and its resolution run on their own task: dropping the
    /// returned future does not cancel them, and the order stays busy until
    /// the server has answered.
    pub async fn advance(
        &self,
        order_id: &str,
        transition: Transition,
        reason: Option<String>,
    ) -> ClientResult<Order> {
        let guard = self
            .inflight
            .try_begin(order_id)
            .ok_or_else(|| ClientError::Busy(order_id.to_string()))?;

        let pending = PendingAction::begin(&self.view, order_id, |order| {
            order.apply_transition(transition, now_millis()).map(|_| ())
        })?;

        let request = TransitionRequest {
            operator: self.operator.clone().with_command_id(new_id()),
            transition,
            reason,
        };

        let backend = Arc::clone(&self.backend);
        let view = Arc::clone(&self.view);
        let task = tokio::spawn(async move {
            let order_id = guard.entity();
            let result = backend.transition(order_id, &request).await;
            match &result {
                Ok(order) => {
                    let merge = match pending {
                        Some(pending) => pending.confirm(order.clone()),
                        None => view.merge(order.clone()),
                    };
                    tracing::debug!(
                        order_id,
                        transition = %transition,
                        status = %order.status,
                        ?merge,
                        "Transition confirmed"
                    );
                }
                Err(err) => {
                    if let Some(pending) = pending {
                        pending.rollback();
                    }
                    tracing::warn!(order_id, transition = %transition, error = %err, "Transition failed");
                    if err.kind().requires_refresh() {
                        if let Err(e) = refresh_order(backend.as_ref(), &view, order_id).await {
                            tracing::warn!(order_id, error = %e, "Refresh after rejection failed");
                        }
                    }
                }
            }
            drop(guard);
            result
        });

        match task.await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(ClientError::InvalidResponse(format!(
                "transition task for {order_id} stopped: {e}"
            ))),
        }
    }

    /// Re-read one order from the server
    pub async fn refresh(&self, order_id: &str) -> ClientResult<Option<Merge>> {
        refresh_order(self.backend.as_ref(), &self.view, order_id).await
    }
}

async fn refresh_order<B: OrderBackend>(
    backend: &B,
    view: &OrderView,
    order_id: &str,
) -> ClientResult<Option<Merge>> {
    match backend.get_order(order_id).await {
        Ok(order) => Ok(Some(view.merge(order))),
        Err(e) if e.code() == Some(shared::error::ErrorCode::OrderNotFound) => {
            view.remove(order_id);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
