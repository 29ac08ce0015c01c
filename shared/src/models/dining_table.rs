//! Dining Table reference
//!
//! Table layout and occupancy belong to the floor plan; orders only carry the
//! identity so floor and customer displays can find the table's order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub id: String,
    /// Number or label printed on the table
    pub name: String,
}

impl TableRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
