//! Order events - immutable facts recorded after a command is accepted

use super::snapshot::Order;
use super::types::{KitchenStage, OrderStatus, Transition};
use crate::models::PaymentRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_id: String,
    /// Global sequence number, the authoritative ordering
    pub sequence: u64,
    pub order_id: String,
    /// Server timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Client timestamp from the command, kept for audit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    pub operator_id: String,
    pub operator_name: String,
    pub command_id: String,
    pub event_type: OrderEventType,
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderCreated,
    StatusChanged,
    PaymentSettled,
    DraftDeleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    /// Initial snapshot, in `draft` or already `sent_to_kitchen`
    OrderCreated { order: Box<Order> },
    StatusChanged {
        transition: Transition,
        from: OrderStatus,
        to: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        kitchen_stage: Option<KitchenStage>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    PaymentSettled { payment: PaymentRecord },
    DraftDeleted,
}

impl EventPayload {
    pub fn event_type(&self) -> OrderEventType {
        match self {
            Self::OrderCreated { .. } => OrderEventType::OrderCreated,
            Self::StatusChanged { .. } => OrderEventType::StatusChanged,
            Self::PaymentSettled { .. } => OrderEventType::PaymentSettled,
            Self::DraftDeleted => OrderEventType::DraftDeleted,
        }
    }
}

impl OrderEvent {
    /// Create a new event stamped with the server clock
    pub fn new(
        sequence: u64,
        order_id: String,
        operator_id: String,
        operator_name: String,
        command_id: String,
        client_timestamp: Option<i64>,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: crate::util::new_id(),
            sequence,
            order_id,
            timestamp: crate::util::now_millis(),
            client_timestamp,
            operator_id,
            operator_name,
            command_id,
            event_type: payload.event_type(),
            payload,
        }
    }

    /// Whether the kitchen display cares about this event
    pub fn is_kitchen_relevant(&self) -> bool {
        match &self.payload {
            EventPayload::OrderCreated { order } => order.status.is_in_kitchen(),
            EventPayload::StatusChanged { .. } | EventPayload::PaymentSettled { .. } => true,
            EventPayload::DraftDeleted => false,
        }
    }
}
