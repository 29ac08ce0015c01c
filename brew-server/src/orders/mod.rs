//! Order event sourcing
//!
//! - **manager**: command processing, event generation and broadcast
//! - **storage**: redb persistence for events, snapshots, payments and indices
//! - **actions**: one handler per command, turning it into events
//! - **appliers**: pure folds from events to snapshots
//!
//! ```text
//! Command → OrdersManager → Event → Storage (redb)
//!                 ↓                      ↓
//!              Broadcast          Snapshot Update
//!                 ↓
//!        Kitchen displays / terminals
//! ```

pub mod actions;
pub mod appliers;
pub mod manager;
pub mod storage;
pub mod traits;

pub use manager::{ManagerError, ManagerResult, OrdersManager};
pub use storage::{OrderStorage, StorageError};
pub use traits::OrderError;

pub use shared::order::{
    CommandError, CommandResponse, EventPayload, Order, OrderCommand, OrderCommandPayload,
    OrderEvent, OrderEventType, OrderStatus,
};
