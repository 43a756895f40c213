//! In-memory wallet provider.
//!
//! Scriptable stand-in for a browser wallet: holds accounts and a network,
//! tracks whether this origin was granted access, and can be told to reject
//! or fail the next request. Used in demo mode and in tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{
    DashboardEvent, EventFilter, EventPublisher, EventTopic, InMemoryEventBus, Subscription,
};
use shared_types::{ChainId, WalletAddress};
use tracing::debug;

use crate::domain::WalletError;
use crate::ports::WalletProvider;

#[derive(Debug, Default)]
struct ProviderState {
    /// Accounts in the wallet, selected first.
    accounts: Vec<WalletAddress>,
    /// Whether this origin holds a grant.
    authorized: bool,
    chain_id: ChainId,
    /// Message for the next `request_accounts` rejection.
    reject_next: Option<String>,
    /// Fail every call with this message while set.
    network_failure: Option<String>,
    /// Number of account prompts answered.
    request_count: usize,
}

/// Scriptable in-memory `WalletProvider`.
pub struct InMemoryWalletProvider {
    state: Mutex<ProviderState>,
    bus: InMemoryEventBus,
}

impl InMemoryWalletProvider {
    /// Create a provider on `chain_id` with no accounts and no grant.
    pub fn new(chain_id: ChainId) -> Self {
        Self {
            state: Mutex::new(ProviderState {
                chain_id,
                ..ProviderState::default()
            }),
            bus: InMemoryEventBus::new(),
        }
    }

    /// Add an account to the wallet.
    pub fn with_account(self, address: WalletAddress) -> Self {
        self.state.lock().accounts.push(address);
        self
    }

    /// Grant this origin access, as if a previous session had connected.
    pub fn authorize(&self) {
        self.state.lock().authorized = true;
    }

    /// Make the next account prompt fail with a user rejection.
    pub fn reject_next_request(&self, message: impl Into<String>) {
        self.state.lock().reject_next = Some(message.into());
    }

    /// Fail all calls with a network error while `Some`.
    pub fn set_network_failure(&self, message: Option<String>) {
        self.state.lock().network_failure = message;
    }

    /// Number of account prompts the user answered.
    pub fn request_count(&self) -> usize {
        self.state.lock().request_count
    }

    /// Live notification registrations.
    pub fn active_listeners(&self) -> usize {
        self.bus.active_subscriptions()
    }

    /// Switch networks and notify listeners.
    pub async fn switch_chain(&self, chain_id: ChainId) {
        self.state.lock().chain_id = chain_id;
        debug!(chain_id, "[st-01] In-memory wallet switched chain");
        self.bus.publish(DashboardEvent::ChainChanged { chain_id }).await;
    }

    /// Replace the wallet's accounts and notify listeners.
    ///
    /// Listeners only see the accounts when this origin holds a grant.
    pub async fn change_accounts(&self, accounts: Vec<WalletAddress>) {
        let visible = {
            let mut state = self.state.lock();
            state.accounts = accounts;
            if state.authorized {
                state.accounts.clone()
            } else {
                Vec::new()
            }
        };
        self.bus
            .publish(DashboardEvent::AccountsChanged { accounts: visible })
            .await;
    }

    /// Revoke this origin's grant and notify listeners with an empty list.
    pub async fn revoke(&self) {
        self.state.lock().authorized = false;
        self.bus
            .publish(DashboardEvent::AccountsChanged { accounts: vec![] })
            .await;
    }

    fn check_network(state: &ProviderState) -> Result<(), WalletError> {
        match &state.network_failure {
            Some(msg) => Err(WalletError::NetworkError(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WalletProvider for InMemoryWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<WalletAddress>, WalletError> {
        let mut state = self.state.lock();
        Self::check_network(&state)?;
        if let Some(msg) = state.reject_next.take() {
            return Err(WalletError::UserRejected(msg));
        }
        state.request_count += 1;
        state.authorized = true;
        Ok(state.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<WalletAddress>, WalletError> {
        let state = self.state.lock();
        Self::check_network(&state)?;
        if state.authorized {
            Ok(state.accounts.clone())
        } else {
            Ok(Vec::new())
        }
    }

    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        let state = self.state.lock();
        Self::check_network(&state)?;
        Ok(state.chain_id)
    }

    fn notifications(&self) -> Subscription {
        self.bus.subscribe(EventFilter::topics(vec![EventTopic::Wallet]))
    }

    fn provider_id(&self) -> &str {
        "in-memory"
    }
}
