//! # Dashboard Container
//!
//! Configuration loading and dependency injection for the runtime.

pub mod components;
pub mod config;

pub use components::{DashboardContainer, WalletBackend, DEMO_ACCOUNT, DEMO_CHAIN_ID};
pub use config::{load_config, DashboardConfig};
