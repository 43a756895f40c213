//! # Provider Poller
//!
//! A JSON-RPC wallet cannot push `chainChanged`/`accountsChanged`; this loop
//! polls it on a fixed interval so the provider can publish them.

use st_01_wallet_session::JsonRpcWalletProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Polls a JSON-RPC wallet provider for changes.
pub struct ProviderPoller {
    provider: Arc<JsonRpcWalletProvider>,
    interval: Duration,
}

impl ProviderPoller {
    /// Create a poller ticking every `interval`.
    pub fn new(provider: Arc<JsonRpcWalletProvider>, interval: Duration) -> Self {
        Self { provider, interval }
    }

    /// Poll forever. Failures are logged once per outage.
    pub async fn run(self) {
        info!(
            url = self.provider.url(),
            interval_ms = self.interval.as_millis() as u64,
            "[st-01] Provider poller started"
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failing = false;

        loop {
            ticker.tick().await;
            match self.provider.poll_changes().await {
                Ok(published) => {
                    if failing {
                        info!("[st-01] Wallet provider reachable again");
                        failing = false;
                    }
                    if published > 0 {
                        debug!(published, "[st-01] Provider notifications published");
                    }
                }
                Err(e) if !failing => {
                    warn!("[st-01] Wallet provider poll failed: {}", e);
                    failing = true;
                }
                Err(e) => debug!("[st-01] Wallet provider still failing: {}", e),
            }
        }
    }
}
