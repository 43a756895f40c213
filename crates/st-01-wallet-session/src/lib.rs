//! # ST-01 Wallet Session
//!
//! Owns the connection between the dashboard and a wallet provider.
//!
//! **Subsystem ID:** 1
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Connect and disconnect a wallet (`connect_wallet`, `disconnect_wallet`)
//! - Silently adopt an already-authorized account at mount
//! - Follow the provider's `chainChanged` / `accountsChanged` notifications
//! - Publish the session to any number of readers through a watch channel
//!
//! The manager is the only writer of session state. Every change goes
//! through the pure transition function `Session::apply`.
//!
//! ## State Machine
//!
//! ```text
//!                  ConnectStart                ConnectSuccess
//! [Disconnected] ──────────────→ [Connecting] ───────────────→ [Connected]
//!       ↑  ↑                          │                           │
//!       │  │                          │ ConnectError              │ AccountChanged(None)
//!       │  │    ConnectStart          ↓                           │
//!       │  └──────────────────── [Error] ←────────────────────────┼───
//!       │                                                         │
//!       └────────────────────── Disconnect (from any state) ──────┘
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! st-01-wallet-session/
//! ├── domain/          # Session, ConnectionStatus, SessionAction, WalletError
//! ├── ports/           # WalletSessionApi (inbound) + WalletProvider (outbound)
//! ├── application/     # WalletSessionManager, NotificationListener
//! ├── adapters/        # InMemoryWalletProvider, JsonRpcWalletProvider
//! └── config.rs        # WalletSessionConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{InMemoryWalletProvider, JsonRpcWalletProvider};
pub use application::{NotificationListener, WalletSessionManager};
pub use config::WalletSessionConfig;
pub use domain::{ConnectionStatus, Session, SessionAction, SessionView, WalletError};
pub use ports::{WalletProvider, WalletSessionApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
