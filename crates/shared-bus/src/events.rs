//! # Dashboard Events
//!
//! Defines all event types that flow through the shared bus.

use shared_types::{ChainId, TxHash, WalletAddress};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    // =========================================================================
    // WALLET PROVIDER NOTIFICATIONS
    // =========================================================================
    /// The provider switched networks.
    /// Source: wallet provider | Target: Subsystem 1
    ChainChanged {
        /// New chain id.
        chain_id: ChainId,
    },

    /// The provider's authorized account list changed.
    /// An empty list means the user revoked access or locked the wallet.
    /// Source: wallet provider | Target: Subsystem 1
    AccountsChanged {
        /// Authorized accounts, most recently selected first.
        accounts: Vec<WalletAddress>,
    },

    // =========================================================================
    // SUBSYSTEM 2: CHAIN SYNC
    // =========================================================================
    /// A write transaction was confirmed and its optimistic patch applied.
    /// Any cached ledger data should be considered stale.
    LedgerUpdated {
        /// Confirmed transaction.
        tx_hash: TxHash,
        /// Ledger method that was called (e.g. `completeShipment`).
        method: &'static str,
    },

    /// A full read batch completed and a new snapshot was published.
    SnapshotPublished {
        /// Snapshot generation number.
        generation: u64,
    },

    /// A read batch failed; the previous snapshot is still current.
    RefreshFailed {
        /// Error description.
        reason: String,
    },
}

impl DashboardEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ChainChanged { .. } | Self::AccountsChanged { .. } => EventTopic::Wallet,
            Self::LedgerUpdated { .. } => EventTopic::Ledger,
            Self::SnapshotPublished { .. } | Self::RefreshFailed { .. } => EventTopic::Sync,
        }
    }

    /// Get the source of this event.
    #[must_use]
    pub fn source(&self) -> &'static str {
        match self.topic() {
            EventTopic::Wallet => "wallet-provider",
            _ => "st-02",
        }
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    /// Wallet provider notifications.
    Wallet,
    /// Confirmed ledger writes.
    Ledger,
    /// Snapshot refresh outcomes.
    Sync,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &DashboardEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
