//! Order Module
//!
//! - Commands: requests from terminals to change orders
//! - Events: immutable facts recorded after command processing
//! - Snapshots: current order state
//! - Lifecycle: the status / kitchen stage state machine

pub mod command;
pub mod event;
pub mod lifecycle;
pub mod snapshot;
pub mod types;

// Re-exports
pub use command::{OrderCommand, OrderCommandPayload};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use lifecycle::{InvalidTransition, OrderVersion, TransitionOutcome};
pub use snapshot::{Order, OrderLine};
pub use types::*;
