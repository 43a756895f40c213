//! # Inbound Ports
//!
//! API trait defining what the chain synchronizer can do.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared_types::{CarbonEmission, Coordinates, DelayPrediction, TxHash};
use std::sync::Arc;
use tokio::sync::watch;

use crate::domain::{NewOrder, NewPartner, OrderResponse, SyncError, ViewSnapshot};

/// Chain Sync API - inbound port.
///
/// Every operation requires a connected session. Writes return the
/// confirmed transaction hash; the snapshot is patched before they return.
#[async_trait]
pub trait ChainSyncApi: Send + Sync {
    /// Re-read orders, partners, emissions and the user location.
    async fn refresh(&self) -> Result<Arc<ViewSnapshot>, SyncError>;

    /// Re-read the delay predictions.
    async fn refresh_predictions(&self) -> Result<Arc<ViewSnapshot>, SyncError>;

    /// Register a partner.
    async fn add_partner(&self, partner: NewPartner) -> Result<TxHash, SyncError>;

    /// Create an order request.
    async fn create_order(&self, order: NewOrder) -> Result<TxHash, SyncError>;

    /// Accept an order request at `price` (decimal display unit).
    async fn accept_order_request(
        &self,
        order_id: &str,
        price: &str,
        delivery_date: NaiveDate,
    ) -> Result<TxHash, SyncError>;

    /// Decline an order request.
    async fn decline_order_request(&self, order_id: &str) -> Result<TxHash, SyncError>;

    /// Accept or decline.
    async fn respond_to_order_request(
        &self,
        order_id: &str,
        response: OrderResponse,
    ) -> Result<TxHash, SyncError>;

    /// Hand an approved order to a carrier.
    async fn start_shipment(&self, order_id: &str, carrier_id: &str) -> Result<TxHash, SyncError>;

    /// Mark a shipment delivered. Pays the order.
    async fn complete_shipment(&self, order_id: &str) -> Result<TxHash, SyncError>;

    /// Store the connected account's location.
    async fn update_user_location(&self, location: Coordinates) -> Result<TxHash, SyncError>;

    /// Record an order's emissions, replacing any previous row.
    async fn record_carbon_emission(&self, emission: CarbonEmission) -> Result<TxHash, SyncError>;

    /// Record an order's delay prediction, replacing any previous one.
    async fn record_delay_prediction(
        &self,
        prediction: DelayPrediction,
    ) -> Result<TxHash, SyncError>;

    /// Current snapshot.
    fn snapshot(&self) -> Arc<ViewSnapshot>;

    /// A reader that observes every published snapshot.
    fn watch(&self) -> watch::Receiver<Arc<ViewSnapshot>>;
}
