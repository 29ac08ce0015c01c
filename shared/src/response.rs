//! Response bodies returned by the server beyond the plain models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{PaymentMethod, PaymentRecord, Session, SessionSummary};
use crate::order::Order;

/// A completed settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub order: Order,
    pub payment: PaymentRecord,
    /// True when this answered a retried command
    #[serde(default)]
    pub duplicate: bool,
}

/// Result of closing a session: the closed record and its frozen summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedSession {
    pub session: Session,
    pub summary: SessionSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpiLink {
    pub order_id: String,
    pub order_number: String,
    pub amount: Decimal,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethods {
    pub methods: Vec<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    pub merchant_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// ok | degraded
    pub status: String,
    pub version: String,
    /// Changes on every server restart
    pub epoch: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}
