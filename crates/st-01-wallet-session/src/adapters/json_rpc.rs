//! JSON-RPC wallet provider.
//!
//! Talks EIP-1193 methods (`eth_requestAccounts`, `eth_accounts`,
//! `eth_chainId`) to a wallet endpoint over HTTP. HTTP has no push channel,
//! so `chainChanged` / `accountsChanged` are synthesized by `poll_changes`,
//! which diffs successive observations and publishes the differences.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use shared_bus::{
    DashboardEvent, EventFilter, EventPublisher, EventTopic, InMemoryEventBus, Subscription,
};
use shared_types::{ChainId, WalletAddress};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

use crate::domain::WalletError;
use crate::ports::WalletProvider;

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a, T> {
    jsonrpc: &'static str,
    method: &'a str,
    params: T,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// What the provider reported at one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderObservation {
    /// Network id.
    pub chain_id: ChainId,
    /// Authorized accounts.
    pub accounts: Vec<WalletAddress>,
}

/// `WalletProvider` backed by a JSON-RPC endpoint.
pub struct JsonRpcWalletProvider {
    client: Client,
    url: String,
    request_id: AtomicU64,
    bus: InMemoryEventBus,
    last_observation: Mutex<Option<ProviderObservation>>,
}

impl JsonRpcWalletProvider {
    /// Create a provider for `url`.
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, WalletError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| WalletError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            request_id: AtomicU64::new(1),
            bus: InMemoryEventBus::new(),
            last_observation: Mutex::new(None),
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn call<R: DeserializeOwned>(&self, method: &str) -> Result<R, WalletError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params: [(); 0],
            id: self.next_id(),
        };
        trace!(method, "[st-01] Wallet RPC call");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    WalletError::NetworkError(format!("Cannot connect to {}", self.url))
                } else {
                    WalletError::NetworkError(e.to_string())
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| WalletError::InvalidResponse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(WalletError::from_rpc(error.code, error.message));
        }

        rpc_response
            .result
            .ok_or_else(|| WalletError::InvalidResponse("missing result".to_string()))
    }

    /// Read the provider and publish whatever changed since the last poll.
    ///
    /// The first successful poll only records a baseline. Returns the number
    /// of notifications published.
    pub async fn poll_changes(&self) -> Result<usize, WalletError> {
        let chain_id = parse_chain_id(&self.call::<String>("eth_chainId").await?)?;
        let accounts = parse_accounts(self.call::<Vec<String>>("eth_accounts").await?)?;
        let next = ProviderObservation { chain_id, accounts };

        let events = {
            let mut last = self.last_observation.lock();
            let events = diff_observation(last.as_ref(), &next);
            *last = Some(next);
            events
        };

        let published = events.len();
        for event in events {
            debug!(?event, "[st-01] Provider change detected");
            self.bus.publish(event).await;
        }
        Ok(published)
    }
}

/// Parse an `eth_chainId` result (`0x`-prefixed hex quantity).
pub(crate) fn parse_chain_id(raw: &str) -> Result<ChainId, WalletError> {
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .ok_or_else(|| WalletError::InvalidResponse(format!("chain id not hex: {raw}")))?;
    ChainId::from_str_radix(digits, 16)
        .map_err(|e| WalletError::InvalidResponse(format!("chain id {raw}: {e}")))
}

/// Parse an `eth_accounts` / `eth_requestAccounts` result.
pub(crate) fn parse_accounts(raw: Vec<String>) -> Result<Vec<WalletAddress>, WalletError> {
    raw.iter()
        .map(|a| WalletAddress::parse(a).map_err(|e| WalletError::InvalidResponse(e.to_string())))
        .collect()
}

/// Notifications implied by moving from `previous` to `next`.
pub(crate) fn diff_observation(
    previous: Option<&ProviderObservation>,
    next: &ProviderObservation,
) -> Vec<DashboardEvent> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut events = Vec::new();
    if previous.chain_id != next.chain_id {
        events.push(DashboardEvent::ChainChanged {
            chain_id: next.chain_id,
        });
    }
    if previous.accounts != next.accounts {
        events.push(DashboardEvent::AccountsChanged {
            accounts: next.accounts.clone(),
        });
    }
    events
}

#[async_trait]
impl WalletProvider for JsonRpcWalletProvider {
    async fn request_accounts(&self) -> Result<Vec<WalletAddress>, WalletError> {
        parse_accounts(self.call("eth_requestAccounts").await?)
    }

    async fn accounts(&self) -> Result<Vec<WalletAddress>, WalletError> {
        parse_accounts(self.call("eth_accounts").await?)
    }

    async fn chain_id(&self) -> Result<ChainId, WalletError> {
        parse_chain_id(&self.call::<String>("eth_chainId").await?)
    }

    fn notifications(&self) -> Subscription {
        self.bus.subscribe(EventFilter::topics(vec![EventTopic::Wallet]))
    }

    fn provider_id(&self) -> &str {
        &self.url
    }
}
