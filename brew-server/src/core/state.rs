use std::path::Path;

use crate::core::{Config, Result, ServerError};
use crate::orders::OrdersManager;
use crate::payments::PaymentService;
use crate::sessions::SessionLedger;

/// Shared handler state
///
/// Cheap to clone: every field is a handle onto the same redb database.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub orders: OrdersManager,
    pub payments: PaymentService,
}

impl ServerState {
    pub fn new(config: Config, orders: OrdersManager) -> Self {
        let payments = PaymentService::new(orders.clone());
        Self {
            config,
            orders,
            payments,
        }
    }

    /// Create the work directory and open `<WORK_DIR>/brew.redb`
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|source| ServerError::WorkDir {
            path: config.work_dir.clone(),
            source,
        })?;

        let db_path = config.database_path();
        let orders = Self::open_orders(config, &db_path)?;
        tracing::info!(
            db_path = %db_path.display(),
            epoch = %orders.epoch(),
            "Order store ready"
        );
        Ok(Self::new(config.clone(), orders))
    }

    fn open_orders(config: &Config, db_path: &Path) -> Result<OrdersManager> {
        let mut orders = OrdersManager::new(db_path)?;
        orders.set_payment_methods(config.payment_methods.clone());
        orders.set_order_number_prefix(config.order_number_prefix.clone());
        Ok(orders)
    }

    pub fn ledger(&self) -> &SessionLedger {
        self.orders.ledger()
    }
}
