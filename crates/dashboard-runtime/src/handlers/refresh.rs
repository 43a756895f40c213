//! # Refresh Handler
//!
//! Keeps the snapshot in step with the session and the ledger:
//!
//! - `(connected, address)` becomes a connected pair, or the address
//!   changes: full refresh plus predictions.
//! - `LedgerUpdated` arrives and refresh-after-write is on: full refresh.
//!
//! Failed refreshes are already logged and reported by the synchronizer;
//! the handler keeps running.

use shared_bus::{DashboardEvent, Subscription};
use shared_types::WalletAddress;
use st_01_wallet_session::Session;
use st_02_chain_sync::ChainSyncApi;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Handler driving refreshes.
pub struct RefreshHandler {
    /// Snapshot owner.
    synchronizer: Arc<dyn ChainSyncApi>,
    /// Wallet session.
    session: watch::Receiver<Session>,
    /// `LedgerUpdated` events, when refresh-after-write is on.
    ledger_events: Option<Subscription>,
}

impl RefreshHandler {
    /// Create a handler. `ledger_events` enables refresh-after-write.
    pub fn new(
        synchronizer: Arc<dyn ChainSyncApi>,
        session: watch::Receiver<Session>,
        ledger_events: Option<Subscription>,
    ) -> Self {
        Self {
            synchronizer,
            session,
            ledger_events,
        }
    }

    /// Run until the session channel closes.
    pub async fn run(mut self) {
        info!("[st-02] Refresh handler started");
        let mut last_account: Option<WalletAddress> = None;

        loop {
            let account = self.session.borrow_and_update().address().cloned();
            if account != last_account {
                if let Some(address) = &account {
                    debug!(account = %address, "[st-02] Account connected; refreshing");
                    self.refresh_all().await;
                }
                last_account = account;
            }

            tokio::select! {
                changed = self.session.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                event = next_event(&mut self.ledger_events) => match event {
                    Some(DashboardEvent::LedgerUpdated { method, .. }) if last_account.is_some() => {
                        debug!(method, "[st-02] Ledger updated; refreshing");
                        let _ = self.synchronizer.refresh().await;
                    }
                    Some(_) => {}
                    None => self.ledger_events = None,
                },
            }
        }
        info!("[st-02] Refresh handler stopped");
    }

    async fn refresh_all(&self) {
        if self.synchronizer.refresh().await.is_ok() {
            let _ = self.synchronizer.refresh_predictions().await;
        }
    }
}

/// Next event, or never when there is no subscription.
async fn next_event(subscription: &mut Option<Subscription>) -> Option<DashboardEvent> {
    match subscription {
        Some(sub) => sub.recv().await,
        None => std::future::pending().await,
    }
}
