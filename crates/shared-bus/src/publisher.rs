//! # Event Publisher
//!
//! `InMemoryEventBus` fans events out over a tokio broadcast channel. The
//! wallet providers publish `chainChanged`/`accountsChanged` through it, and
//! the chain synchronizer publishes ledger updates and refresh outcomes.

use crate::events::{DashboardEvent, EventFilter};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing side of the bus, as seen by the subsystems.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish `event`; returns how many receivers were live.
    async fn publish(&self, event: DashboardEvent) -> usize;
}

/// Broadcast-backed bus shared by every component of one dashboard.
pub struct InMemoryEventBus {
    sender: broadcast::Sender<DashboardEvent>,
    /// Live subscriptions; each `Subscription` decrements it on drop.
    live: Arc<AtomicUsize>,
}

impl InMemoryEventBus {
    /// Bus buffering `DEFAULT_CHANNEL_CAPACITY` events per subscriber.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CHANNEL_CAPACITY);
        Self {
            sender,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to events matching `filter`. Dropping the handle unsubscribes.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.live.fetch_add(1, Ordering::SeqCst);
        debug!(topics = ?filter.topics, "Subscription opened");
        Subscription::new(self.sender.subscribe(), filter, Arc::clone(&self.live))
    }

    /// Subscriptions not yet dropped.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: DashboardEvent) -> usize {
        let (topic, source) = (event.topic(), event.source());
        match self.sender.send(event) {
            Ok(receivers) => {
                debug!(topic = ?topic, source, receivers, "Event published");
                receivers
            }
            Err(_) => {
                // Nobody listening is normal before mount and after teardown.
                trace!(topic = ?topic, source, "Event dropped (no receivers)");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventTopic;

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = InMemoryEventBus::new();
        assert_eq!(bus.publish(DashboardEvent::ChainChanged { chain_id: 1 }).await, 0);
    }

    #[tokio::test]
    async fn test_every_subscriber_is_a_receiver() {
        let bus = InMemoryEventBus::default();
        let _all = bus.subscribe(EventFilter::all());
        let _ledger = bus.subscribe(EventFilter::topics(vec![EventTopic::Ledger]));

        // Filtering happens on the receiving side.
        let receivers = bus
            .publish(DashboardEvent::SnapshotPublished { generation: 1 })
            .await;
        assert_eq!(receivers, 2);
        assert_eq!(bus.active_subscriptions(), 2);
    }

    #[test]
    fn test_dropped_subscription_is_released() {
        let bus = InMemoryEventBus::new();
        let wallet = bus.subscribe(EventFilter::topics(vec![EventTopic::Wallet]));
        let sync = bus.subscribe(EventFilter::topics(vec![EventTopic::Sync]));
        assert_eq!(bus.active_subscriptions(), 2);

        drop(wallet);
        assert_eq!(bus.active_subscriptions(), 1);
        drop(sync);
        assert_eq!(bus.active_subscriptions(), 0);
    }
}
