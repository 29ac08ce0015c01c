//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::PaymentRecord;
use shared::order::{
    CommandResponse, KitchenStage, Order, OrderCommand, OrderCommandPayload, OrderEvent,
    OrderFilter, OrderStatus,
};
use shared::request::{CreateOrderRequest, Operator, PayOrderRequest, TransitionRequest};
use shared::response::{Settlement, UpiLink};

use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};

/// `status` is a comma separated list
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub kitchen_stage: Option<KitchenStage>,
    #[serde(default)]
    pub table_id: Option<String>,
}

impl ListQuery {
    fn into_filter(self) -> AppResult<OrderFilter> {
        let statuses = match self.status {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(parse_status)
                .collect::<AppResult<Vec<_>>>()?,
            None => Vec::new(),
        };
        Ok(OrderFilter {
            statuses,
            session_id: self.session_id,
            kitchen_stage: self.kitchen_stage,
            table_id: self.table_id,
        })
    }
}

fn parse_status(value: &str) -> AppResult<OrderStatus> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .map_err(|_| AppError::validation(format!("Unknown order status: {value}")))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

/// Run a command; rejected commands become an error response
fn run(state: &ServerState, cmd: OrderCommand) -> AppResult<CommandResponse> {
    let response = state.orders.execute_command(cmd);
    match response.error {
        Some(err) => Err(err.into()),
        None => Ok(response),
    }
}

fn load(state: &ServerState, order_id: &str) -> AppResult<Order> {
    state
        .orders
        .get_order(order_id)?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::OrderNotFound, format!("Order {order_id} not found"))
        })
}

/// Place an order (or save a draft)
pub async fn create(
    State(state): State<ServerState>,
    Json(req): Json<CreateOrderRequest>,
) -> AppResult<Json<Order>> {
    let payload = if req.draft {
        OrderCommandPayload::SaveDraft {
            submission: req.submission,
        }
    } else {
        OrderCommandPayload::PlaceOrder {
            submission: req.submission,
        }
    };
    let response = run(&state, req.operator.command(payload))?;
    let order_id = response
        .order_id
        .ok_or_else(|| AppError::internal("Created order has no id"))?;
    Ok(Json(load(&state, &order_id)?))
}

/// Execute a raw command
pub async fn execute(
    State(state): State<ServerState>,
    Json(cmd): Json<OrderCommand>,
) -> Json<CommandResponse> {
    Json(state.orders.execute_command(cmd))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let filter = query.into_filter()?;
    Ok(Json(state.orders.list_orders(&filter)?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    Ok(Json(load(&state, &id)?))
}

/// Kitchen advance or cancel
pub async fn transition(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> AppResult<Json<Order>> {
    let payload = OrderCommandPayload::Transition {
        order_id: id.clone(),
        transition: req.transition,
        reason: req.reason,
    };
    run(&state, req.operator.command(payload))?;
    Ok(Json(load(&state, &id)?))
}

/// Hard-delete a draft
pub async fn delete_draft(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(operator): Query<Operator>,
) -> AppResult<Json<CommandResponse>> {
    let payload = OrderCommandPayload::DeleteDraft { order_id: id };
    Ok(Json(run(&state, operator.command(payload))?))
}

/// Audit trail of one order
pub async fn events(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<OrderEvent>>> {
    Ok(Json(state.orders.get_events_for_order(&id)?))
}

pub async fn events_since(
    State(state): State<ServerState>,
    Query(query): Query<EventsQuery>,
) -> AppResult<Json<Vec<OrderEvent>>> {
    Ok(Json(state.orders.get_events_since(query.since)?))
}

pub async fn payments(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<PaymentRecord>>> {
    Ok(Json(state.payments.payments_for_order(&id)?))
}

pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(req): Json<PayOrderRequest>,
) -> AppResult<Json<Settlement>> {
    Ok(Json(state.payments.pay(&id, req)?))
}

pub async fn upi_link(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<UpiLink>> {
    Ok(Json(state.payments.upi_link(&id)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_parses_statuses() {
        let query = ListQuery {
            status: Some("sent_to_kitchen, preparing".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert_eq!(
            filter.statuses,
            vec![OrderStatus::SentToKitchen, OrderStatus::Preparing]
        );
    }

    #[test]
    fn test_list_query_rejects_unknown_status() {
        let query = ListQuery {
            status: Some("served".to_string()),
            ..Default::default()
        };
        let err = query.into_filter().unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_empty_status_list_matches_everything() {
        let query = ListQuery {
            status: Some(" , ".to_string()),
            session_id: Some("s-1".to_string()),
            ..Default::default()
        };
        let filter = query.into_filter().unwrap();
        assert!(filter.statuses.is_empty());
        assert_eq!(filter.session_id.as_deref(), Some("s-1"));
    }
}
