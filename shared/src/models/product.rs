//! Product Model
//!
//! Products are owned by the catalog; orders only keep a reference and a
//! price/tax snapshot taken when the order is placed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog product as seen by the register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// List price
    pub price: Decimal,
    /// Tax rate in percentage (e.g., 18 = 18%)
    pub tax_percentage: Decimal,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal, tax_percentage: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            tax_percentage,
            is_active: true,
            category_id: None,
        }
    }
}
