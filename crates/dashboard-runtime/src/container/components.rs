//! # Component Container
//!
//! Builds every component once and hands out shared handles.
//!
//! ## Initialization Order
//!
//! 1. Event bus
//! 2. Wallet provider (JSON-RPC, or in-memory in demo mode)
//! 3. Wallet session manager (st-01)
//! 4. Ledger and prediction services
//! 5. Chain synchronizer (st-02), reading the session through a watch channel

use anyhow::{Context, Result};
use shared_bus::InMemoryEventBus;
use shared_types::{ChainId, WalletAddress};
use st_01_wallet_session::{
    InMemoryWalletProvider, JsonRpcWalletProvider, WalletProvider, WalletSessionApi,
    WalletSessionManager,
};
use st_02_chain_sync::{ChainSynchronizer, HttpCarbonService, HttpDelayService, InMemoryLedger};
use std::sync::Arc;
use tracing::{info, warn};

use super::config::DashboardConfig;

/// Chain id reported by the demo wallet (a local development chain).
pub const DEMO_CHAIN_ID: ChainId = 31337;

/// Account the demo wallet has already authorized.
pub const DEMO_ACCOUNT: &str = "0x90f79bf6eb2c4f870365e785982e1f101e93b906";

/// Demo account location, in ledger micro-degrees (New York).
const DEMO_LOCATION: (i64, i64) = (40_712_800, -74_006_000);

/// Which wallet provider the container was built with.
pub enum WalletBackend {
    /// Scriptable provider, pre-authorized with `DEMO_ACCOUNT`.
    Demo(Arc<InMemoryWalletProvider>),
    /// Remote wallet; notifications need polling.
    ///
    /// Only the session talks to the wallet. The ledger is still the
    /// in-memory simulation, starting empty: writes are neither signed by
    /// the wallet nor sent to a chain.
    JsonRpc(Arc<JsonRpcWalletProvider>),
}

impl WalletBackend {
    fn provider(&self) -> Arc<dyn WalletProvider> {
        match self {
            WalletBackend::Demo(p) => Arc::clone(p) as Arc<dyn WalletProvider>,
            WalletBackend::JsonRpc(p) => Arc::clone(p) as Arc<dyn WalletProvider>,
        }
    }
}

/// All components of a running dashboard.
pub struct DashboardContainer {
    /// Configuration the container was built from.
    pub config: DashboardConfig,
    /// Runtime event bus (ledger updates, snapshot outcomes).
    pub bus: Arc<InMemoryEventBus>,
    /// Wallet provider.
    pub wallet: WalletBackend,
    /// Subsystem 1.
    pub session: Arc<WalletSessionManager>,
    /// Ledger collaborator.
    pub ledger: Arc<InMemoryLedger>,
    /// Subsystem 2.
    pub synchronizer: Arc<ChainSynchronizer<InMemoryLedger>>,
}

impl DashboardContainer {
    /// Build every component from `config`.
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let bus = Arc::new(InMemoryEventBus::new());

        let (wallet, ledger) = match &config.wallet_rpc_url {
            Some(url) => {
                let provider =
                    JsonRpcWalletProvider::new(url.clone(), config.wallet.rpc_timeout_secs)
                        .context("Failed to create JSON-RPC wallet provider")?;
                info!(url = %url, "Wallet provider: JSON-RPC");
                warn!("Ledger is simulated in memory; writes are not signed or broadcast");
                (
                    WalletBackend::JsonRpc(Arc::new(provider)),
                    Arc::new(InMemoryLedger::new()),
                )
            }
            None => {
                let account =
                    WalletAddress::parse(DEMO_ACCOUNT).context("Invalid demo account")?;
                let provider =
                    InMemoryWalletProvider::new(DEMO_CHAIN_ID).with_account(account.clone());
                provider.authorize();

                let ledger = InMemoryLedger::with_demo_data();
                ledger.set_location(account, DEMO_LOCATION.0, DEMO_LOCATION.1);
                info!(account = DEMO_ACCOUNT, "Wallet provider: in-memory demo");
                (WalletBackend::Demo(Arc::new(provider)), Arc::new(ledger))
            }
        };

        let session = Arc::new(WalletSessionManager::new(
            config.wallet.clone(),
            Some(wallet.provider()),
        ));

        let carbon = HttpCarbonService::new(
            &config.services.carbon_service_url,
            config.services.timeout_secs,
        )
        .context("Failed to create carbon service client")?;
        let delay = HttpDelayService::new(
            &config.services.delay_service_url,
            config.services.timeout_secs,
        )
        .context("Failed to create delay service client")?;

        let synchronizer = Arc::new(
            ChainSynchronizer::new(config.sync.clone(), Arc::clone(&ledger), session.watch())
                .with_event_bus(bus.clone())
                .with_carbon_service(Arc::new(carbon))
                .with_delay_service(Arc::new(delay)),
        );

        Ok(Self {
            config,
            bus,
            wallet,
            session,
            ledger,
            synchronizer,
        })
    }

    /// The JSON-RPC provider, when not in demo mode.
    pub fn rpc_provider(&self) -> Option<Arc<JsonRpcWalletProvider>> {
        match &self.wallet {
            WalletBackend::JsonRpc(p) => Some(Arc::clone(p)),
            WalletBackend::Demo(_) => None,
        }
    }

    /// The demo provider, when in demo mode.
    pub fn demo_provider(&self) -> Option<Arc<InMemoryWalletProvider>> {
        match &self.wallet {
            WalletBackend::Demo(p) => Some(Arc::clone(p)),
            WalletBackend::JsonRpc(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_container() {
        let container = DashboardContainer::new(DashboardConfig::for_testing()).unwrap();
        assert!(container.demo_provider().is_some());
        assert!(container.rpc_provider().is_none());
        assert!(container.session.has_provider());
    }

    #[test]
    fn test_rpc_container() {
        let config = DashboardConfig {
            wallet_rpc_url: Some("http://localhost:8545".into()),
            ..DashboardConfig::for_testing()
        };
        let container = DashboardContainer::new(config).unwrap();
        assert_eq!(
            container.rpc_provider().unwrap().url(),
            "http://localhost:8545"
        );
        // The ledger stays simulated and starts empty in this mode.
        assert!(container.ledger.order_record("ORD-1001").is_none());
        assert!(container.ledger.submitted_calls().is_empty());
    }
}
