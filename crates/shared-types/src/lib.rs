//! # Shared Types Crate
//!
//! This crate contains the domain entities shared by the wallet session
//! (`st-01`) and the chain synchronizer (`st-02`).
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Partner, order, emission and prediction
//!   shapes are defined once, here.
//! - **Validated Identity**: `WalletAddress` and `TxHash` can only be built
//!   from well-formed input; malformed input is a `ValidationError`.
//! - **Ledger Vocabulary**: status enums round-trip through the exact
//!   strings the contract stores (`"In Transit"`, `"Picked Up"`, ...).

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
