//! # Integration Tests
//!
//! Session ↔ synchronizer flows over the in-memory provider and ledger.

pub mod flows;
