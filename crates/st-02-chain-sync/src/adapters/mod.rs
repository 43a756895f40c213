//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the ledger and prediction service ports.

mod http;
mod in_memory;

pub use http::{HttpCarbonService, HttpDelayService};
pub use in_memory::{InMemoryLedger, LedgerFault};
