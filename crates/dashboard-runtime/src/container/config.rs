//! # Dashboard Configuration
//!
//! Unified configuration for both subsystems and the runtime loop.
//!
//! ## Environment Overrides
//!
//! | Variable                | Field                               |
//! |-------------------------|-------------------------------------|
//! | `ST_WALLET_RPC_URL`     | `wallet_rpc_url` (unset = demo mode)|
//! | `ST_CARBON_SERVICE_URL` | `services.carbon_service_url`       |
//! | `ST_DELAY_SERVICE_URL`  | `services.delay_service_url`        |
//! | `ST_CONFIRMATIONS`      | `sync.required_confirmations`       |
//! | `ST_POLL_INTERVAL_MS`   | `poll_interval_ms`                  |
//! | `ST_LOG_LEVEL`          | `log_level`                         |
//!
//! Unparseable values are logged and ignored.

use st_01_wallet_session::WalletSessionConfig;
use st_02_chain_sync::{ServiceConfig, SyncConfig};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Complete dashboard configuration.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Wallet session configuration.
    pub wallet: WalletSessionConfig,
    /// Chain synchronizer configuration.
    pub sync: SyncConfig,
    /// Prediction service endpoints.
    pub services: ServiceConfig,
    /// JSON-RPC endpoint of the wallet. `None` runs the demo.
    pub wallet_rpc_url: Option<String>,
    /// How often the JSON-RPC provider is polled for chain/account changes.
    pub poll_interval_ms: u64,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Re-read the ledger after every confirmed write.
    pub refresh_after_write: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            wallet: WalletSessionConfig::default(),
            sync: SyncConfig::default(),
            services: ServiceConfig::default(),
            wallet_rpc_url: None,
            poll_interval_ms: 2_000,
            log_level: "info".to_string(),
            refresh_after_write: true,
        }
    }
}

impl DashboardConfig {
    /// Create a config for testing (short timeouts, fast polling).
    pub fn for_testing() -> Self {
        Self {
            wallet: WalletSessionConfig::for_testing(),
            sync: SyncConfig::for_testing(),
            services: ServiceConfig::for_testing(),
            wallet_rpc_url: None,
            poll_interval_ms: 50,
            log_level: "debug".to_string(),
            refresh_after_write: true,
        }
    }

    /// True when no wallet endpoint is configured.
    pub fn is_demo(&self) -> bool {
        self.wallet_rpc_url.is_none()
    }

    /// Poll period as a `Duration`.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Apply overrides from `lookup` (a variable name to value function).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("ST_WALLET_RPC_URL").filter(|u| !u.trim().is_empty()) {
            info!(url = %url, "Using JSON-RPC wallet provider");
            self.wallet_rpc_url = Some(url);
        }
        if let Some(url) = lookup("ST_CARBON_SERVICE_URL") {
            self.services.carbon_service_url = url;
        }
        if let Some(url) = lookup("ST_DELAY_SERVICE_URL") {
            self.services.delay_service_url = url;
        }
        if let Some(n) = parsed(&lookup, "ST_CONFIRMATIONS") {
            self.sync.required_confirmations = n;
        }
        if let Some(ms) = parsed(&lookup, "ST_POLL_INTERVAL_MS") {
            self.poll_interval_ms = ms;
        }
        if let Some(level) = lookup("ST_LOG_LEVEL") {
            self.log_level = level;
        }
        self
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} is not a valid number: {:?}", key, raw);
            None
        }
    }
}

/// Load configuration from defaults and the process environment.
pub fn load_config() -> DashboardConfig {
    DashboardConfig::default().with_overrides(|key| std::env::var(key).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_run_demo() {
        let config = DashboardConfig::default();
        assert!(config.is_demo());
        assert_eq!(config.sync.required_confirmations, 1);
        assert!(config.refresh_after_write);
    }

    #[test]
    fn test_overrides() {
        let config = DashboardConfig::default().with_overrides(env(&[
            ("ST_WALLET_RPC_URL", "http://localhost:8545"),
            ("ST_CARBON_SERVICE_URL", "http://carbon:5001"),
            ("ST_CONFIRMATIONS", "3"),
            ("ST_POLL_INTERVAL_MS", "500"),
            ("ST_LOG_LEVEL", "st_02_chain_sync=debug"),
        ]));

        assert!(!config.is_demo());
        assert_eq!(config.services.carbon_service_url, "http://carbon:5001");
        assert_eq!(config.sync.required_confirmations, 3);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert_eq!(config.log_level, "st_02_chain_sync=debug");
    }

    #[test]
    fn test_bad_values_are_ignored() {
        let config = DashboardConfig::default().with_overrides(env(&[
            ("ST_WALLET_RPC_URL", "  "),
            ("ST_CONFIRMATIONS", "many"),
        ]));
        assert!(config.is_demo());
        assert_eq!(config.sync.required_confirmations, 1);
    }
}
