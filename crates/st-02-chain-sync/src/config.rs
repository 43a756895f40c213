//! # Chain Sync Configuration

use serde::{Deserialize, Serialize};

/// Decimals of the ledger's price unit (ether ↔ wei).
pub const DEFAULT_PRICE_DECIMALS: u32 = 18;

/// Synchronizer configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Confirmations to wait for before a write counts as final.
    pub required_confirmations: u64,

    /// Fixed exponent between the display price and the ledger unit.
    pub price_decimals: u32,

    /// Read the connected account's location as part of `refresh`.
    pub include_location: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            required_confirmations: 1,
            price_decimals: DEFAULT_PRICE_DECIMALS,
            include_location: true,
        }
    }
}

impl SyncConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self::default()
    }
}

/// Endpoints of the external prediction services.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the carbon calculator.
    pub carbon_service_url: String,

    /// Base URL of the delay predictor.
    pub delay_service_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            carbon_service_url: "http://localhost:5001".to_string(),
            delay_service_url: "http://localhost:5002".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ServiceConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 1,
            ..Self::default()
        }
    }
}
