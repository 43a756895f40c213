//! # Wallet Session Manager
//!
//! Application service owning the session and its provider.

use async_trait::async_trait;
use shared_bus::DashboardEvent;
use shared_types::{ChainId, WalletAddress};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::WalletSessionConfig;
use crate::domain::{Session, SessionAction, WalletError};
use crate::ports::{WalletProvider, WalletSessionApi};

/// Wallet Session Manager - sole writer of the session.
pub struct WalletSessionManager {
    /// Configuration.
    config: WalletSessionConfig,
    /// Injected provider; `None` when no wallet is installed.
    provider: Option<Arc<dyn WalletProvider>>,
    /// Session state, one writer many readers.
    state: watch::Sender<Session>,
}

impl WalletSessionManager {
    /// Create a manager for an (optional) provider.
    pub fn new(config: WalletSessionConfig, provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let (state, _) = watch::channel(Session::initial());
        Self {
            config,
            provider,
            state,
        }
    }

    /// Whether a provider is injected.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Apply one transition and notify readers if anything changed.
    fn dispatch(&self, action: SessionAction) -> Session {
        debug!("[st-01] Dispatching {:?}", action);
        self.state.send_if_modified(|current| {
            let next = current.apply(action);
            if next == *current {
                return false;
            }
            *current = next;
            true
        });
        self.state.borrow().clone()
    }

    /// Internal: prompt for accounts and read the network.
    async fn request_connection(
        provider: &dyn WalletProvider,
    ) -> Result<(WalletAddress, ChainId), WalletError> {
        let accounts = provider.request_accounts().await?;
        let address = accounts
            .into_iter()
            .next()
            .ok_or_else(|| WalletError::NetworkError("no accounts returned".to_string()))?;
        let chain_id = provider.chain_id().await?;
        Ok((address, chain_id))
    }

    /// Best-effort silent reconnect.
    ///
    /// Adopts an already-authorized account without prompting. Every failure
    /// is logged and swallowed; the session is left untouched.
    pub async fn restore_session(&self) -> Option<WalletAddress> {
        if !self.config.restore_on_mount {
            return None;
        }
        let provider = self.provider.as_ref()?;

        let accounts = match provider.accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!("[st-01] Failed to check wallet connection: {}", e);
                return None;
            }
        };
        let address = accounts.into_iter().next()?;

        let chain_id = match provider.chain_id().await {
            Ok(chain_id) => chain_id,
            Err(e) => {
                warn!("[st-01] Failed to read network during restore: {}", e);
                return None;
            }
        };

        info!(address = %address, chain_id, "[st-01] Restored wallet session");
        self.dispatch(SessionAction::ConnectSuccess {
            address: address.clone(),
            chain_id,
        });
        Some(address)
    }

    /// Translate a provider notification into a transition.
    ///
    /// Events on other topics are ignored.
    pub fn handle_notification(&self, event: DashboardEvent) -> Session {
        match event {
            DashboardEvent::ChainChanged { chain_id } => {
                info!(chain_id, "[st-01] Chain changed");
                self.dispatch(SessionAction::ChainChanged(chain_id))
            }
            DashboardEvent::AccountsChanged { accounts } => {
                let selected = accounts.into_iter().next();
                match &selected {
                    Some(address) => info!(address = %address, "[st-01] Account changed"),
                    None => info!("[st-01] Wallet reported no accounts"),
                }
                self.dispatch(SessionAction::AccountChanged(selected))
            }
            _ => self.state.borrow().clone(),
        }
    }

    /// Register for provider notifications for the lifetime of the returned
    /// listener. `None` without a provider.
    pub fn start_listening(self: &Arc<Self>) -> Option<NotificationListener> {
        let provider = self.provider.as_ref()?;
        // Subscribe before spawning so nothing published in between is lost.
        let mut subscription = provider.notifications();
        let manager = Arc::clone(self);

        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                manager.handle_notification(event);
            }
            debug!("[st-01] Notification stream closed");
        });

        debug!(provider = provider.provider_id(), "[st-01] Listening for wallet notifications");
        Some(NotificationListener { task: Some(task) })
    }

    /// Start listening, then attempt a silent reconnect.
    pub async fn mount(self: &Arc<Self>) -> Option<NotificationListener> {
        let listener = self.start_listening();
        self.restore_session().await;
        listener
    }
}

#[async_trait]
impl WalletSessionApi for WalletSessionManager {
    async fn connect_wallet(&self) -> Result<WalletAddress, WalletError> {
        let Some(provider) = self.provider.clone() else {
            warn!("[st-01] Connect requested without a wallet provider");
            self.dispatch(SessionAction::ConnectError(
                self.config.missing_provider_message.clone(),
            ));
            return Err(WalletError::ProviderMissing);
        };

        self.dispatch(SessionAction::ConnectStart);

        match Self::request_connection(provider.as_ref()).await {
            Ok((address, chain_id)) => {
                info!(address = %address, chain_id, "[st-01] Wallet connected");
                self.dispatch(SessionAction::ConnectSuccess {
                    address: address.clone(),
                    chain_id,
                });
                Ok(address)
            }
            Err(e) => {
                error!("[st-01] Failed to connect wallet: {}", e);
                self.dispatch(SessionAction::ConnectError(e.provider_message()));
                Err(e)
            }
        }
    }

    fn disconnect_wallet(&self) {
        info!("[st-01] Wallet disconnected locally");
        self.dispatch(SessionAction::Disconnect);
    }

    fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    fn watch(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }
}

/// Scoped registration for provider notifications.
///
/// Dropping the listener aborts its task, which drops the underlying bus
/// subscription. `stop` does the same and waits until it has happened.
pub struct NotificationListener {
    task: Option<JoinHandle<()>>,
}

impl NotificationListener {
    /// Whether the listener task is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Deregister and wait for the subscription to be released.
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for NotificationListener {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryWalletProvider;
    use crate::domain::ConnectionStatus;
    use std::time::Duration;

    fn addr(n: u8) -> WalletAddress {
        WalletAddress::parse(&format!("0x{:040x}", n)).unwrap()
    }

    fn manager_with(provider: &Arc<InMemoryWalletProvider>) -> Arc<WalletSessionManager> {
        let provider: Arc<dyn WalletProvider> = provider.clone();
        Arc::new(WalletSessionManager::new(
            WalletSessionConfig::for_testing(),
            Some(provider),
        ))
    }

    async fn wait_for<F: Fn(&Session) -> bool>(rx: &mut watch::Receiver<Session>, f: F) {
        tokio::time::timeout(Duration::from_millis(500), rx.wait_for(|s| f(s)))
            .await
            .expect("timeout")
            .expect("sender alive");
    }

    #[tokio::test]
    async fn test_connect_without_provider() {
        let manager = WalletSessionManager::new(WalletSessionConfig::for_testing(), None);

        let result = manager.connect_wallet().await;
        assert_eq!(result, Err(WalletError::ProviderMissing));

        let session = manager.session();
        assert!(!session.is_connected());
        assert!(session.error().unwrap().contains("MetaMask"));
    }

    #[tokio::test]
    async fn test_connect_success() {
        let provider = Arc::new(InMemoryWalletProvider::new(11155111).with_account(addr(1)));
        let manager = manager_with(&provider);

        let address = manager.connect_wallet().await.unwrap();
        assert_eq!(address, addr(1));

        let session = manager.session();
        assert!(session.is_connected());
        assert_eq!(session.chain_id(), Some(11155111));
        assert_eq!(provider.request_count(), 1);
    }

    #[tokio::test]
    async fn test_connect_user_rejected() {
        let provider = Arc::new(InMemoryWalletProvider::new(1).with_account(addr(1)));
        provider.reject_next_request("User denied account authorization");
        let manager = manager_with(&provider);

        let result = manager.connect_wallet().await;
        assert!(matches!(result, Err(WalletError::UserRejected(_))));
        assert_eq!(
            manager.session().status(),
            &ConnectionStatus::Error {
                message: "User denied account authorization".into()
            }
        );
    }

    #[tokio::test]
    async fn test_connect_network_error() {
        let provider = Arc::new(InMemoryWalletProvider::new(1).with_account(addr(1)));
        provider.set_network_failure(Some("rpc unreachable".into()));
        let manager = manager_with(&provider);

        let result = manager.connect_wallet().await;
        assert!(matches!(result, Err(WalletError::NetworkError(_))));
        assert_eq!(manager.session().error(), Some("rpc unreachable"));
    }

    #[tokio::test]
    async fn test_connect_with_empty_wallet() {
        let provider = Arc::new(InMemoryWalletProvider::new(1));
        let manager = manager_with(&provider);

        assert!(manager.connect_wallet().await.is_err());
        assert!(!manager.session().is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_is_local_only() {
        let provider = Arc::new(InMemoryWalletProvider::new(1).with_account(addr(1)));
        let manager = manager_with(&provider);
        manager.connect_wallet().await.unwrap();

        manager.disconnect_wallet();
        assert_eq!(manager.session(), Session::initial());
        // Grant persists on the wallet side.
        assert_eq!(provider.accounts().await.unwrap(), vec![addr(1)]);
    }

    #[tokio::test]
    async fn test_restore_adopts_authorized_account_without_prompt() {
        let provider = Arc::new(InMemoryWalletProvider::new(5).with_account(addr(2)));
        provider.authorize();
        let manager = manager_with(&provider);

        let restored = manager.restore_session().await;
        assert_eq!(restored, Some(addr(2)));
        assert!(manager.session().is_connected());
        assert_eq!(provider.request_count(), 0);
    }

    #[tokio::test]
    async fn test_restore_without_grant_does_nothing() {
        let provider = Arc::new(InMemoryWalletProvider::new(5).with_account(addr(2)));
        let manager = manager_with(&provider);

        assert!(manager.restore_session().await.is_none());
        assert_eq!(manager.session(), Session::initial());
    }

    #[tokio::test]
    async fn test_restore_swallows_errors() {
        let provider = Arc::new(InMemoryWalletProvider::new(5).with_account(addr(2)));
        provider.authorize();
        provider.set_network_failure(Some("down".into()));
        let manager = manager_with(&provider);

        assert!(manager.restore_session().await.is_none());
        assert!(manager.session().error().is_none());
    }

    #[tokio::test]
    async fn test_notifications_drive_session() {
        let provider = Arc::new(InMemoryWalletProvider::new(1).with_account(addr(1)));
        let manager = manager_with(&provider);
        let mut rx = manager.watch();
        let _listener = manager.start_listening().unwrap();
        manager.connect_wallet().await.unwrap();

        provider.switch_chain(137).await;
        wait_for(&mut rx, |s| s.chain_id() == Some(137)).await;

        provider.change_accounts(vec![addr(3)]).await;
        wait_for(&mut rx, |s| s.address() == Some(&addr(3))).await;

        provider.change_accounts(vec![]).await;
        wait_for(&mut rx, |s| !s.is_connected()).await;
        assert_eq!(manager.session().chain_id(), Some(137));
    }

    #[tokio::test]
    async fn test_listener_releases_subscription_on_stop() {
        let provider = Arc::new(InMemoryWalletProvider::new(1));
        let manager = manager_with(&provider);

        for _ in 0..3 {
            let listener = manager.start_listening().unwrap();
            assert!(listener.is_active());
            assert_eq!(provider.active_listeners(), 1);
            listener.stop().await;
            assert_eq!(provider.active_listeners(), 0);
        }
    }

    #[tokio::test]
    async fn test_no_listener_without_provider() {
        let manager = Arc::new(WalletSessionManager::new(
            WalletSessionConfig::for_testing(),
            None,
        ));
        assert!(manager.start_listening().is_none());
        assert!(manager.mount().await.is_none());
    }

    #[tokio::test]
    async fn test_watch_skips_no_op_transitions() {
        let provider = Arc::new(InMemoryWalletProvider::new(1));
        let manager = manager_with(&provider);
        let mut rx = manager.watch();

        manager.disconnect_wallet();
        assert!(!rx.has_changed().unwrap());

        manager.handle_notification(DashboardEvent::ChainChanged { chain_id: 9 });
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();
    }
}
