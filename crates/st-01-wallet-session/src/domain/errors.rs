//! # Domain Errors
//!
//! Error types for the wallet session.

use thiserror::Error;

/// EIP-1193 error code for a request the user declined.
pub const USER_REJECTED_CODE: i64 = 4001;

/// Wallet session error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WalletError {
    /// No wallet provider is injected.
    #[error("No wallet provider available")]
    ProviderMissing,

    /// The user declined the wallet prompt.
    #[error("User rejected the request: {0}")]
    UserRejected(String),

    /// Transport or provider failure.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The provider answered with something we cannot interpret.
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl WalletError {
    /// The provider's own message, as stored in the session's `error`.
    pub fn provider_message(&self) -> String {
        match self {
            WalletError::ProviderMissing => self.to_string(),
            WalletError::UserRejected(msg)
            | WalletError::NetworkError(msg)
            | WalletError::InvalidResponse(msg) => msg.clone(),
        }
    }

    /// Map an EIP-1193 / JSON-RPC error object onto the taxonomy.
    pub fn from_rpc(code: i64, message: impl Into<String>) -> Self {
        if code == USER_REJECTED_CODE {
            WalletError::UserRejected(message.into())
        } else {
            WalletError::NetworkError(message.into())
        }
    }
}
