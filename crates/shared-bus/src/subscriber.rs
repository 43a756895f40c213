//! # Subscriptions
//!
//! A `Subscription` is the receiving half of one listener: the wallet
//! session's notification task, or the runtime's refresh handler.

use crate::events::{DashboardEvent, EventFilter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Scoped handle receiving the events its filter matches.
pub struct Subscription {
    receiver: broadcast::Receiver<DashboardEvent>,
    filter: EventFilter,
    live: Arc<AtomicUsize>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<DashboardEvent>,
        filter: EventFilter,
        live: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            receiver,
            filter,
            live,
        }
    }

    /// Next matching event, or `None` once the bus is gone.
    ///
    /// A lagging receiver skips what it missed; listeners here react to the
    /// latest state, not to every intermediate event.
    pub async fn recv(&mut self) -> Option<DashboardEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "Subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!(topics = ?self.filter.topics, "Subscription released");
    }
}
