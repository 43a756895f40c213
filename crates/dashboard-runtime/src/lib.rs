//! # Dashboard Runtime Library
//!
//! Wires the wallet session (st-01) to the chain synchronizer (st-02) and
//! runs the background tasks that keep the snapshot fresh. The binary in
//! `main.rs` is a thin shell around [`DashboardRuntime`].
//!
//! ## Startup Sequence
//!
//! 1. Build the container (provider, ledger, session, synchronizer)
//! 2. Mount the session: restore an authorized account, start listening
//! 3. Spawn the refresh handler
//! 4. Spawn the provider poller (JSON-RPC wallets only)
//!
//! ## Shutdown
//!
//! A watch channel signals every task; the notification listener is stopped
//! so no wallet subscription outlives the runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod container;
pub mod handlers;

use anyhow::Result;
use parking_lot::Mutex;
use shared_bus::{EventFilter, EventTopic};
use st_01_wallet_session::{NotificationListener, WalletSessionApi};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

pub use container::{load_config, DashboardConfig, DashboardContainer};
pub use handlers::{ProviderPoller, RefreshHandler};

/// How long shutdown waits for each task.
const TASK_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// The runtime orchestrating both subsystems.
pub struct DashboardRuntime {
    /// Component container.
    container: Arc<DashboardContainer>,
    /// Wallet notification listener, while mounted.
    listener: Mutex<Option<NotificationListener>>,
    /// Spawned background tasks.
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
}

impl DashboardRuntime {
    /// Build the runtime from `config`.
    pub fn new(config: DashboardConfig) -> Result<Self> {
        info!(demo = config.is_demo(), "Creating dashboard runtime");
        let container = Arc::new(DashboardContainer::new(config)?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            container,
            listener: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx,
            shutdown_rx,
        })
    }

    /// Mount the session and spawn the background tasks.
    pub async fn start(&self) -> Result<()> {
        info!("===========================================");
        info!("  SupplyTrack Dashboard Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let listener = self.container.session.mount().await;
        if listener.is_none() {
            warn!("No wallet provider; the session stays disconnected");
        }
        *self.listener.lock() = listener;

        let ledger_events = self
            .container
            .config
            .refresh_after_write
            .then(|| {
                self.container
                    .bus
                    .subscribe(EventFilter::topics(vec![EventTopic::Ledger]))
            });
        let handler = RefreshHandler::new(
            self.container.synchronizer.clone(),
            self.container.session.watch(),
            ledger_events,
        );
        self.spawn_until_shutdown("refresh handler", handler.run());

        if let Some(provider) = self.container.rpc_provider() {
            let poller = ProviderPoller::new(provider, self.container.config.poll_interval());
            self.spawn_until_shutdown("provider poller", poller.run());
        }

        let session = self.container.session.session();
        match session.address() {
            Some(address) => info!(account = %address, "Dashboard ready"),
            None => info!("Dashboard ready; waiting for a wallet connection"),
        }
        Ok(())
    }

    fn spawn_until_shutdown(
        &self,
        name: &'static str,
        task: impl std::future::Future<Output = ()> + Send + 'static,
    ) {
        let mut shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = task => {}
                _ = shutdown.changed() => {
                    info!("{} received shutdown signal", name);
                }
            }
        });
        self.tasks.lock().push(handle);
    }

    /// Signal every task, stop the notification listener and wait for the
    /// tasks to finish.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let listener = self.listener.lock().take();
        if let Some(listener) = listener {
            listener.stop().await;
        }

        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            if tokio::time::timeout(TASK_SHUTDOWN_TIMEOUT, task).await.is_err() {
                warn!("Task did not stop within {:?}", TASK_SHUTDOWN_TIMEOUT);
            }
        }
        info!("Shutdown complete");
    }

    /// Shared component container.
    pub fn container(&self) -> Arc<DashboardContainer> {
        Arc::clone(&self.container)
    }
}
