//! # Application Layer
//!
//! The session manager and its scoped notification listener.

mod service;

pub use service::{NotificationListener, WalletSessionManager};
