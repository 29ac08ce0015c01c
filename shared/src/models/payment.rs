//! Payment Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Upi,
    Bank,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [Self::Cash, Self::Card, Self::Upi, Self::Bank];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Upi => "upi",
            Self::Bank => "bank",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "upi" => Ok(Self::Upi),
            "bank" => Ok(Self::Bank),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// Settled payment, written once per paid order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: String,
    pub order_id: String,
    pub session_id: String,
    pub method: PaymentMethod,
    pub amount: Decimal,
    /// UPI id or card/bank transaction reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub operator_id: String,
    pub created_at: i64,
}

/// Payment request from a terminal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Which payment methods a terminal accepts, plus UPI merchant details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodConfig {
    pub enabled: Vec<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
    pub merchant_name: String,
}

impl Default for PaymentMethodConfig {
    fn default() -> Self {
        Self {
            enabled: vec![PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Upi],
            upi_id: None,
            merchant_name: "Brew Cafe".to_string(),
        }
    }
}

impl PaymentMethodConfig {
    pub fn is_enabled(&self, method: PaymentMethod) -> bool {
        self.enabled.contains(&method)
    }

    /// Build the `upi://pay` deep link a customer scans to pay `amount`.
    ///
    /// Returns `None` when UPI is disabled or no UPI id is configured.
    pub fn upi_link(&self, amount: Decimal, order_number: &str) -> Option<String> {
        if !self.is_enabled(PaymentMethod::Upi) {
            return None;
        }
        let upi_id = self.upi_id.as_deref()?;
        Some(format!(
            "upi://pay?pa={}&pn={}&am={:.2}&cu=INR&tn={}",
            encode_component(upi_id),
            encode_component(&self.merchant_name),
            amount,
            encode_component(&format!("Order {order_number}")),
        ))
    }
}

/// Percent-encode everything outside the RFC 3986 unreserved set (`@` kept for VPAs).
fn encode_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'@' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
