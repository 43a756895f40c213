//! # Domain Module
//!
//! Ledger encodings, the snapshot and the projections derived from it.

pub mod commands;
pub mod errors;
pub mod projections;
pub mod records;
pub mod snapshot;
pub mod units;

pub use commands::*;
pub use errors::*;
pub use projections::{
    derive_markers, eligible_for_shipment_completion, eligible_for_shipment_start,
    filter_partners, pending_order_requests, DelaySeverity, MapMarker, MarkerKind,
    ShipmentSummary,
};
pub use records::*;
pub use snapshot::*;
