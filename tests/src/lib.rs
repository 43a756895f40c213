//! # SupplyTrack Test Suite
//!
//! Cross-subsystem flows that no single crate can test alone.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/          # Snapshot projection and unit conversion benchmarks
//! └── src/integration/  # Wallet session (st-01) ↔ chain sync (st-02) flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p st-tests
//! cargo bench -p st-tests
//! ```

pub mod integration;
