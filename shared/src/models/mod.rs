//! Data models
//!
//! Shared between the server and the terminals (via API).

pub mod dining_table;
pub mod payment;
pub mod product;
pub mod session;

// Re-exports
pub use dining_table::*;
pub use payment::*;
pub use product::*;
pub use session::*;
