//! # Outbound Ports
//!
//! Traits for external dependencies (the wallet provider).

use async_trait::async_trait;
use shared_bus::Subscription;
use shared_types::{ChainId, WalletAddress};

use crate::domain::WalletError;

/// Wallet provider - outbound port.
///
/// Mirrors the EIP-1193 surface the dashboard uses.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Ask the user for account access (`eth_requestAccounts`). May prompt.
    async fn request_accounts(&self) -> Result<Vec<WalletAddress>, WalletError>;

    /// Accounts already authorized for this origin (`eth_accounts`).
    /// Never prompts.
    async fn accounts(&self) -> Result<Vec<WalletAddress>, WalletError>;

    /// Current network (`eth_chainId`).
    async fn chain_id(&self) -> Result<ChainId, WalletError>;

    /// Subscribe to `chainChanged` / `accountsChanged`.
    ///
    /// The registration lasts exactly as long as the returned handle.
    fn notifications(&self) -> Subscription;

    /// Provider identifier (for logging/debugging).
    fn provider_id(&self) -> &str;
}
