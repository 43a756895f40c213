//! # Inbound Ports
//!
//! API trait defining what the wallet session can do.

use async_trait::async_trait;
use shared_types::WalletAddress;
use tokio::sync::watch;

use crate::domain::{Session, WalletError};

/// Wallet Session API - inbound port.
#[async_trait]
pub trait WalletSessionApi: Send + Sync {
    /// Request account access and adopt the granted account.
    ///
    /// Failures are also recorded in the session's `error`.
    async fn connect_wallet(&self) -> Result<WalletAddress, WalletError>;

    /// Reset the session locally. The provider keeps its grant.
    fn disconnect_wallet(&self);

    /// Current session.
    fn session(&self) -> Session;

    /// A reader that observes every session change.
    fn watch(&self) -> watch::Receiver<Session>;
}
