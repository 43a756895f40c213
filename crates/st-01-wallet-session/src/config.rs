//! # Wallet Session Configuration

use serde::{Deserialize, Serialize};

/// Message shown when no wallet provider is injected.
pub const DEFAULT_MISSING_PROVIDER_MESSAGE: &str =
    "Please install MetaMask to connect your wallet";

/// Wallet session configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WalletSessionConfig {
    /// Adopt an already-authorized account at mount without prompting.
    pub restore_on_mount: bool,

    /// User-facing error stored in the session when no provider exists.
    pub missing_provider_message: String,

    /// Timeout for JSON-RPC wallet requests, in seconds.
    ///
    /// Only bounds transport; an account prompt is answered by the wallet
    /// before the request returns.
    pub rpc_timeout_secs: u64,
}

impl Default for WalletSessionConfig {
    fn default() -> Self {
        Self {
            restore_on_mount: true,
            missing_provider_message: DEFAULT_MISSING_PROVIDER_MESSAGE.to_string(),
            rpc_timeout_secs: 120,
        }
    }
}

impl WalletSessionConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            restore_on_mount: true,
            missing_provider_message: DEFAULT_MISSING_PROVIDER_MESSAGE.to_string(),
            rpc_timeout_secs: 2,
        }
    }
}
