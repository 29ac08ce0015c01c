//! Brew server - the authoritative store of a café POS
//!
//! - **orders** (`orders`): event-sourced orders on redb, command pipeline
//! - **sessions** (`sessions`): register sessions and their sales ledger
//! - **payments** (`payments`): settlement and UPI links
//! - **HTTP API** (`api`): axum routes used by registers and kitchen displays
//!
//! ```text
//! brew-server/src/
//! ├── core/          # config, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── orders/        # order event sourcing
//! ├── sessions/      # session ledger
//! ├── payments/      # payment settlement
//! └── utils/         # logging, error re-exports
//! ```

pub mod api;
pub mod core;
pub mod orders;
pub mod payments;
pub mod sessions;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use orders::{OrderStorage, OrdersManager};
pub use payments::PaymentService;
pub use sessions::SessionLedger;
pub use utils::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env`, read the configuration and start logging
pub fn setup_environment() -> anyhow::Result<Config> {
    if let Err(e) = dotenv::dotenv()
        && !e.not_found()
    {
        return Err(e.into());
    }

    let config = Config::from_env();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.log_dir.as_deref(),
    )?;
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____
   / __ )________ _      __
  / __  / ___/ _ \ | /| / /
 / /_/ / /  /  __/ |/ |/ /
/_____/_/   \___/|__/|__/
    "#
    );
}
