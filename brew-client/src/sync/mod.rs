//! Order synchronization for terminal screens
//!
//! - [`OrderView`]: local copies, merged through the version comparator
//! - [`Poller`]: fixed-interval refresh of one query
//! - [`KitchenSync`]: optimistic kitchen actions with rollback
//! - [`InFlight`]: at most one outstanding action per order

mod inflight;
mod kitchen;
mod optimistic;
mod poller;
mod view;

pub use inflight::{InFlight, InFlightGuard};
pub use kitchen::KitchenSync;
pub use optimistic::PendingAction;
pub use poller::{KitchenQueue, OrderList, PollSource, Poller, TableOrder};
pub use view::{Merge, OrderView, PollReport, supersedes};
