//! # ST-02 Chain Sync
//!
//! Keeps a local snapshot of the trade ledger and writes back to it.
//!
//! **Subsystem ID:** 2
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Read every ledger collection concurrently and publish one immutable
//!   `ViewSnapshot` per successful batch (`refresh`)
//! - Submit writes on behalf of the connected account, wait for
//!   confirmation, then patch the snapshot optimistically
//! - Derive display projections (map markers, shipment summary, filters)
//! - Call the carbon and delay prediction services for active shipments
//!
//! ## Consistency Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | All-or-nothing reads | One failing read keeps the previous snapshot |
//! | Confirmed writes only | No patch unless the receipt succeeded |
//! | Serialized mutation | Refreshes and patches share one async mutex |
//! | Connected writer | Every operation requires a connected session |
//!
//! ## Module Structure
//!
//! ```text
//! st-02-chain-sync/
//! ├── domain/          # SyncError, unit codecs, records, snapshot, projections
//! ├── ports/           # ChainSyncApi (inbound) + LedgerClient, services (outbound)
//! ├── application/     # ChainSynchronizer
//! ├── adapters/        # InMemoryLedger, HTTP prediction services
//! └── config.rs        # SyncConfig, ServiceConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{HttpCarbonService, HttpDelayService, InMemoryLedger, LedgerFault};
pub use application::ChainSynchronizer;
pub use config::{ServiceConfig, SyncConfig};
pub use domain::{
    derive_markers, filter_partners, CarbonEstimate, DelaySeverity, LedgerCall, MapMarker,
    MarkerKind, NewOrder, NewPartner, OrderResponse, ShipmentSummary, SyncError, TxReceipt,
    ViewSnapshot,
};
pub use ports::{CarbonService, ChainSyncApi, DelayService, LedgerClient};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
