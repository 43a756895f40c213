//! # Application Layer
//!
//! The synchronizer service.

mod service;

pub use service::ChainSynchronizer;
