//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implementations of the `WalletProvider` outbound port.

mod in_memory;
mod json_rpc;

pub use in_memory::InMemoryWalletProvider;
pub use json_rpc::{JsonRpcWalletProvider, ProviderObservation};
