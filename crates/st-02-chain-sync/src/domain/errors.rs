//! # Domain Errors
//!
//! Error types for the chain synchronizer.

use shared_types::{TxHash, ValidationError};
use st_01_wallet_session::WalletError;
use thiserror::Error;

/// Chain sync error types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// No connected session.
    #[error("Wallet not connected")]
    NotConnected,

    /// Input rejected before submission.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The transaction was mined but reverted.
    #[error("Transaction {tx} reverted")]
    TransactionReverted {
        /// Reverted transaction.
        tx: TxHash,
    },

    /// Ledger transport failure or ledger-side rejection.
    #[error("Ledger error: {0}")]
    Network(String),

    /// A prediction service answered with a failure or was unreachable.
    #[error("{service} service unavailable: {message}")]
    ServiceUnavailable {
        /// `carbon` or `delay`.
        service: &'static str,
        /// HTTP status, when one was received.
        status: Option<u16>,
        /// Description.
        message: String,
    },

    /// The wallet refused to sign.
    #[error("Wallet error: {0}")]
    Wallet(String),
}

impl From<WalletError> for SyncError {
    fn from(err: WalletError) -> Self {
        SyncError::Wallet(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_transparent() {
        let err: SyncError = ValidationError::new("lat", "not a number").into();
        assert_eq!(err.to_string(), "invalid lat: not a number");
    }

    #[test]
    fn test_wallet_error_conversion() {
        let err: SyncError = WalletError::UserRejected("denied".into()).into();
        assert!(matches!(err, SyncError::Wallet(ref m) if m.contains("denied")));
    }

    #[test]
    fn test_service_unavailable_display() {
        let err = SyncError::ServiceUnavailable {
            service: "carbon",
            status: Some(503),
            message: "HTTP 503".into(),
        };
        assert_eq!(err.to_string(), "carbon service unavailable: HTTP 503");
    }
}
