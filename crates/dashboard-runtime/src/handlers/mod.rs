//! # Runtime Handlers
//!
//! Long-running tasks spawned by the runtime.

pub mod poller;
pub mod refresh;

pub use poller::ProviderPoller;
pub use refresh::RefreshHandler;
