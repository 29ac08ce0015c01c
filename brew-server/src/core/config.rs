use shared::models::{PaymentMethod, PaymentMethodConfig};
use std::path::PathBuf;

use crate::orders::manager::DEFAULT_ORDER_NUMBER_PREFIX;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Database and log root |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_LEVEL | info | Filter when `RUST_LOG` is unset |
/// | LOG_DIR | (none) | Daily rolling log files |
/// | LOG_JSON | false | JSON log lines on stdout |
/// | ENABLED_PAYMENT_METHODS | cash,card,upi | Comma separated |
/// | UPI_ID | (none) | Payee VPA for UPI links |
/// | MERCHANT_NAME | Brew Cafe | Payee name for UPI links |
/// | ORDER_NUMBER_PREFIX | BR | Prefix of order numbers |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
///
/// ```ignore
/// WORK_DIR=/var/lib/brew HTTP_PORT=8080 brew-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub payment_methods: PaymentMethodConfig,
    pub order_number_prefix: String,
    /// Request timeout (milliseconds)
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load from the process environment, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_or = |key: &str, default: u64| -> u64 {
            lookup(key).and_then(|v| v.parse().ok()).unwrap_or(default)
        };

        let defaults = PaymentMethodConfig::default();
        let enabled = lookup("ENABLED_PAYMENT_METHODS")
            .map(|list| parse_methods(&list))
            .unwrap_or(defaults.enabled);

        Self {
            work_dir: lookup("WORK_DIR").unwrap_or_else(|| "./data".into()),
            http_port: lookup("HTTP_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "development".into()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".into()),
            log_dir: lookup("LOG_DIR").filter(|d| !d.is_empty()),
            log_json: lookup("LOG_JSON")
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            payment_methods: PaymentMethodConfig {
                enabled,
                upi_id: lookup("UPI_ID").filter(|v| !v.is_empty()),
                merchant_name: lookup("MERCHANT_NAME").unwrap_or(defaults.merchant_name),
            },
            order_number_prefix: lookup("ORDER_NUMBER_PREFIX")
                .unwrap_or_else(|| DEFAULT_ORDER_NUMBER_PREFIX.into()),
            request_timeout_ms: parse_or("REQUEST_TIMEOUT_MS", 30000),
        }
    }

    /// Override the work directory and port (tests)
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port,
            ..Self::default()
        }
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("brew.redb")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Unknown names are skipped with a warning
fn parse_methods(list: &str) -> Vec<PaymentMethod> {
    let mut methods = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.parse::<PaymentMethod>() {
            Ok(method) if !methods.contains(&method) => methods.push(method),
            Ok(_) => {}
            Err(e) => tracing::warn!(method = %name, error = %e, "Ignoring unknown payment method"),
        }
    }
    methods
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.order_number_prefix, "BR");
        assert_eq!(config.request_timeout_ms, 30000);
        assert_eq!(
            config.payment_methods.enabled,
            vec![PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Upi]
        );
        assert!(config.is_development());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_overrides_from_lookup() {
        let config = config_from(&[
            ("HTTP_PORT", "8080"),
            ("ENVIRONMENT", "production"),
            ("ENABLED_PAYMENT_METHODS", "cash, upi,crypto,cash"),
            ("UPI_ID", "brew@okaxis"),
            ("ORDER_NUMBER_PREFIX", "KC"),
            ("LOG_JSON", "true"),
        ]);
        assert_eq!(config.http_port, 8080);
        assert!(config.is_production());
        assert_eq!(
            config.payment_methods.enabled,
            vec![PaymentMethod::Cash, PaymentMethod::Upi]
        );
        assert_eq!(config.payment_methods.upi_id.as_deref(), Some("brew@okaxis"));
        assert_eq!(config.order_number_prefix, "KC");
        assert!(config.log_json);
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = config_from(&[("HTTP_PORT", "not-a-port"), ("REQUEST_TIMEOUT_MS", "-1")]);
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.request_timeout_ms, 30000);
    }

    #[test]
    fn test_database_path() {
        let config = Config::with_overrides("/tmp/brew", 0);
        assert_eq!(config.database_path(), PathBuf::from("/tmp/brew/brew.redb"));
    }
}
