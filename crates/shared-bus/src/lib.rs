//! # Shared Bus - Event Bus for Dashboard Subsystems
//!
//! Carries the notifications that cross subsystem boundaries:
//!
//! - wallet provider notifications (`chainChanged`, `accountsChanged`)
//!   consumed by the wallet session (st-01);
//! - ledger updates and snapshot publications emitted by the chain
//!   synchronizer (st-02) and consumed by the runtime's refresh handler.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Wallet       │                    │ Session      │
//! │ Provider     │    publish()       │ Manager      │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! ## Scoped Subscriptions
//!
//! A `Subscription` is released when dropped. Handler registration is
//! therefore tied to the lifetime of whatever owns the subscription, and
//! remounting a listener can never leave a stale handler behind.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{DashboardEvent, EventFilter, EventTopic};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::Subscription;

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 256);
    }
}
