//! # Chain Synchronizer
//!
//! Application service owning the snapshot.
//!
//! Reads fan out concurrently and join fail-fast; a batch either publishes a
//! complete snapshot or leaves the previous one in place. Writes wait for
//! confirmation and only then patch. Refreshes and patches are serialized by
//! one async mutex, so a patch never lands in the middle of a read batch.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use shared_bus::{DashboardEvent, EventPublisher};
use shared_types::{
    require_non_empty, CarbonEmission, Coordinates, DelayPrediction, Order, Partner,
    RequestStatus, ShipmentStatus, TxHash, WalletAddress,
};
use st_01_wallet_session::Session;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::domain::{
    projections, units, CarbonEstimate, EmissionRecord, LedgerCall,
    NewOrder, NewPartner, OrderRecord, OrderResponse, PartnerRecord, SyncError, ViewSnapshot,
};
use crate::ports::{CarbonService, ChainSyncApi, DelayService, LedgerClient};

/// Read `count` then every index concurrently.
async fn read_counted<T, C, F, I>(count: C, at: I) -> Result<Vec<T>, SyncError>
where
    C: Future<Output = Result<u64, SyncError>>,
    F: Future<Output = Result<T, SyncError>>,
    I: Fn(u64) -> F,
{
    let n = count.await?;
    try_join_all((0..n).map(at)).await
}

/// Raw rows of one full read batch.
struct ReadBatch {
    orders: Vec<OrderRecord>,
    partners: Vec<PartnerRecord>,
    emissions: Vec<EmissionRecord>,
    location: Option<Coordinates>,
}

/// Chain Synchronizer - sole writer of the snapshot.
pub struct ChainSynchronizer<L: LedgerClient> {
    /// Configuration.
    config: SyncConfig,
    /// Ledger collaborator.
    ledger: Arc<L>,
    /// Wallet session, read-only.
    session: watch::Receiver<Session>,
    /// Published snapshot.
    snapshot: watch::Sender<Arc<ViewSnapshot>>,
    /// Serializes refreshes and patches.
    mutation: Mutex<()>,
    /// Ledger update notifications.
    bus: Option<Arc<dyn EventPublisher>>,
    /// Carbon calculator.
    carbon: Option<Arc<dyn CarbonService>>,
    /// Delay predictor.
    delay: Option<Arc<dyn DelayService>>,
}

impl<L: LedgerClient + 'static> ChainSynchronizer<L> {
    /// Create a synchronizer reading `session`.
    pub fn new(config: SyncConfig, ledger: Arc<L>, session: watch::Receiver<Session>) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(ViewSnapshot::default()));
        Self {
            config,
            ledger,
            session,
            snapshot,
            mutation: Mutex::new(()),
            bus: None,
            carbon: None,
            delay: None,
        }
    }

    /// Publish ledger updates and refresh outcomes on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<dyn EventPublisher>) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Attach the carbon calculator.
    pub fn with_carbon_service(mut self, service: Arc<dyn CarbonService>) -> Self {
        self.carbon = Some(service);
        self
    }

    /// Attach the delay predictor.
    pub fn with_delay_service(mut self, service: Arc<dyn DelayService>) -> Self {
        self.delay = Some(service);
        self
    }

    /// Internal: the connected account, or `NotConnected`.
    fn connected_account(&self) -> Result<WalletAddress, SyncError> {
        self.session
            .borrow()
            .address()
            .cloned()
            .ok_or(SyncError::NotConnected)
    }

    async fn publish_event(&self, event: DashboardEvent) {
        if let Some(bus) = &self.bus {
            bus.publish(event).await;
        }
    }

    /// Internal: read every collection of a full refresh.
    async fn read_batch(&self, user: &WalletAddress) -> Result<ReadBatch, SyncError> {
        let ledger = self.ledger.as_ref();
        let location = async {
            if !self.config.include_location {
                return Ok(self.snapshot.borrow().user_location);
            }
            let (lat, lng) = ledger.get_user_location(user).await?;
            Ok::<_, SyncError>(units::decode_location(lat, lng))
        };

        let (orders, partners, emissions, location) = futures::try_join!(
            read_counted(ledger.orders_count(), |i| ledger.order_at(i)),
            read_counted(ledger.partners_count(), |i| ledger.partner_at(i)),
            read_counted(ledger.carbon_emissions_count(), |i| {
                ledger.carbon_emission_at(i)
            }),
            location,
        )?;

        Ok(ReadBatch {
            orders,
            partners,
            emissions,
            location,
        })
    }

    /// Internal: decode a batch into the next snapshot.
    fn build_snapshot(
        &self,
        batch: ReadBatch,
        previous: &ViewSnapshot,
    ) -> Result<ViewSnapshot, SyncError> {
        let today = Utc::now().date_naive();
        let orders = batch
            .orders
            .into_iter()
            .map(|r| r.decode(self.config.price_decimals))
            .collect::<Result<Vec<_>, _>>()?;
        let partners = batch
            .partners
            .into_iter()
            .map(|r| r.decode(today))
            .collect::<Result<Vec<_>, _>>()?;

        let mut next = ViewSnapshot {
            partners,
            orders,
            emissions: Vec::new(),
            predictions: previous.predictions.clone(),
            user_location: batch.location,
            generation: previous.generation + 1,
            refreshed_at: Some(Utc::now()),
        };
        for record in batch.emissions {
            next.upsert_emission(record.decode());
        }
        Ok(next)
    }

    /// Internal: confirmed-write path shared by every write operation.
    async fn execute_write<F>(&self, call: LedgerCall, patch: F) -> Result<TxHash, SyncError>
    where
        F: FnOnce(&mut ViewSnapshot) + Send,
    {
        let from = self.connected_account()?;
        let method = call.method();
        info!(method, from = %from, "[st-02] Submitting transaction");

        let tx = self.ledger.submit(&from, call).await.map_err(|e| {
            error!(method, "[st-02] Submission failed: {}", e);
            e
        })?;

        let receipt = self
            .ledger
            .wait_for_confirmation(tx, self.config.required_confirmations)
            .await
            .map_err(|e| {
                error!(method, tx = %tx, "[st-02] Confirmation failed: {}", e);
                e
            })?;
        if !receipt.success {
            error!(method, tx = %tx, "[st-02] Transaction reverted");
            return Err(SyncError::TransactionReverted { tx });
        }

        {
            let _guard = self.mutation.lock().await;
            let mut next = ViewSnapshot::clone(&self.snapshot.borrow());
            patch(&mut next);
            self.snapshot.send_replace(Arc::new(next));
        }

        info!(method, tx = %tx, "[st-02] Transaction confirmed");
        self.publish_event(DashboardEvent::LedgerUpdated {
            tx_hash: tx,
            method,
        })
        .await;
        Ok(tx)
    }

    /// Internal: patch one order, if the snapshot has it.
    fn patch_order(snapshot: &mut ViewSnapshot, order_id: &str, f: impl FnOnce(&mut Order)) {
        match snapshot.order_mut(order_id) {
            Some(order) => f(order),
            None => debug!(order_id, "[st-02] Confirmed order not in snapshot; skipping patch"),
        }
    }

    /// Carbon estimate for one order, without recording it.
    pub async fn estimate_carbon(&self, order_id: &str) -> Result<CarbonEstimate, SyncError> {
        require_non_empty("orderId", order_id)?;
        let service = self.carbon.as_ref().ok_or_else(|| unconfigured("carbon"))?;
        service.calculate(order_id).await
    }

    /// Delay prediction for one order, without recording it.
    pub async fn predict_delay(&self, order_id: &str) -> Result<DelayPrediction, SyncError> {
        require_non_empty("orderId", order_id)?;
        let service = self.delay.as_ref().ok_or_else(|| unconfigured("delay"))?;
        service.predict(order_id).await
    }

    /// Active shipments still lacking a row, per `has_row`.
    fn active_without(&self, has_row: impl Fn(&ViewSnapshot, &str) -> bool) -> Vec<String> {
        let snapshot = self.snapshot();
        snapshot
            .orders
            .iter()
            .filter(|o| projections::awaiting_predictions(o) && !has_row(&snapshot, &o.id))
            .map(|o| o.id.clone())
            .collect()
    }

    /// Calculate and record emissions for every picked-up or in-transit
    /// order without a row. Failures are logged and skipped. Returns the
    /// number recorded.
    pub async fn calculate_emissions_for_active_shipments(&self) -> Result<usize, SyncError> {
        let service = self.carbon.clone().ok_or_else(|| unconfigured("carbon"))?;
        self.connected_account()?;

        let mut recorded = 0;
        for order_id in self.active_without(|s, id| s.emission_for(id).is_some()) {
            let estimate = match service.calculate(&order_id).await {
                Ok(estimate) => estimate,
                Err(e) => {
                    warn!(order_id, "[st-02] Error calculating emissions: {}", e);
                    continue;
                }
            };
            match self.record_carbon_emission(estimate.into_emission()).await {
                Ok(_) => recorded += 1,
                Err(e) => warn!(order_id, "[st-02] Error recording emissions: {}", e),
            }
        }
        info!(recorded, "[st-02] Emissions calculated for active shipments");
        Ok(recorded)
    }

    /// Predict and record delays for every picked-up or in-transit order
    /// without a prediction. Failures are logged and skipped. Returns the
    /// number recorded.
    pub async fn predict_delays_for_active_shipments(&self) -> Result<usize, SyncError> {
        let service = self.delay.clone().ok_or_else(|| unconfigured("delay"))?;
        self.connected_account()?;

        let mut recorded = 0;
        for order_id in self.active_without(|s, id| s.prediction_for(id).is_some()) {
            let prediction = match service.predict(&order_id).await {
                Ok(prediction) => prediction,
                Err(e) => {
                    warn!(order_id, "[st-02] Error predicting delay: {}", e);
                    continue;
                }
            };
            match self.record_delay_prediction(prediction).await {
                Ok(_) => recorded += 1,
                Err(e) => warn!(order_id, "[st-02] Error recording prediction: {}", e),
            }
        }
        info!(recorded, "[st-02] Delays predicted for active shipments");
        Ok(recorded)
    }
}

fn unconfigured(service: &'static str) -> SyncError {
    SyncError::ServiceUnavailable {
        service,
        status: None,
        message: "not configured".to_string(),
    }
}

#[async_trait]
impl<L: LedgerClient + 'static> ChainSyncApi for ChainSynchronizer<L> {
    async fn refresh(&self) -> Result<Arc<ViewSnapshot>, SyncError> {
        let user = self.connected_account()?;
        let _guard = self.mutation.lock().await;
        debug!(user = %user, "[st-02] Refreshing ledger snapshot");

        let previous = self.snapshot();
        let next = match self.read_batch(&user).await {
            Ok(batch) => self.build_snapshot(batch, &previous),
            Err(e) => Err(e),
        };

        match next {
            Ok(next) => {
                let next = Arc::new(next);
                info!(
                    generation = next.generation,
                    partners = next.partners.len(),
                    orders = next.orders.len(),
                    emissions = next.emissions.len(),
                    "[st-02] Snapshot published"
                );
                self.snapshot.send_replace(Arc::clone(&next));
                self.publish_event(DashboardEvent::SnapshotPublished {
                    generation: next.generation,
                })
                .await;
                Ok(next)
            }
            Err(e) => {
                error!("[st-02] Error fetching ledger data: {}", e);
                self.publish_event(DashboardEvent::RefreshFailed {
                    reason: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    async fn refresh_predictions(&self) -> Result<Arc<ViewSnapshot>, SyncError> {
        self.connected_account()?;
        let _guard = self.mutation.lock().await;
        let ledger = self.ledger.as_ref();

        let records = read_counted(ledger.delay_predictions_count(), |i| {
            ledger.delay_prediction_at(i)
        })
        .await
        .map_err(|e| {
            error!("[st-02] Error fetching delay predictions: {}", e);
            e
        })?;

        let mut next = ViewSnapshot::clone(&self.snapshot.borrow());
        next.predictions.clear();
        for record in records {
            next.upsert_prediction(record.decode());
        }
        debug!(predictions = next.predictions.len(), "[st-02] Predictions refreshed");

        let next = Arc::new(next);
        self.snapshot.send_replace(Arc::clone(&next));
        Ok(next)
    }

    async fn add_partner(&self, partner: NewPartner) -> Result<TxHash, SyncError> {
        let call = LedgerCall::add_partner(&partner);
        let today = Utc::now().date_naive();
        self.execute_write(call, move |s| {
            s.partners.push(Partner {
                id: partner.id,
                name: partner.name,
                partner_type: partner.partner_type,
                position: partner.position,
                wallet_address: partner.wallet_address,
                created_at: today,
            });
        })
        .await
    }

    async fn create_order(&self, order: NewOrder) -> Result<TxHash, SyncError> {
        require_non_empty("orderId", &order.id)?;
        require_non_empty("supplierId", &order.supplier_id)?;
        require_non_empty("productId", &order.product_id)?;

        let call = LedgerCall::CreateOrder {
            id: order.id.clone(),
            supplier_id: order.supplier_id.clone(),
            product_id: order.product_id.clone(),
            transport_type: order.transport_type.as_str().to_string(),
        };
        let today = Utc::now().date_naive();
        self.execute_write(call, move |s| {
            s.orders.push(Order {
                id: order.id,
                supplier_id: order.supplier_id,
                product_id: order.product_id,
                order_date: today,
                delivery_date: None,
                price: None,
                is_paid: false,
                shipment_status: ShipmentStatus::Pending,
                request_status: RequestStatus::Pending,
                carrier_id: None,
                transport_type: order.transport_type,
            });
        })
        .await
    }

    async fn accept_order_request(
        &self,
        order_id: &str,
        price: &str,
        delivery_date: NaiveDate,
    ) -> Result<TxHash, SyncError> {
        require_non_empty("orderId", order_id)?;
        let amount = units::parse_units(price, self.config.price_decimals)?;
        let display_price = units::decode_price(amount, self.config.price_decimals);

        let call = LedgerCall::AcceptOrderRequest {
            order_id: order_id.to_string(),
            price: amount,
            delivery_date: units::date_to_unix(delivery_date),
        };
        self.execute_write(call, |s| {
            Self::patch_order(s, order_id, |o| {
                o.request_status = RequestStatus::Approved;
                o.price = display_price;
                o.delivery_date = Some(delivery_date);
            })
        })
        .await
    }

    async fn decline_order_request(&self, order_id: &str) -> Result<TxHash, SyncError> {
        require_non_empty("orderId", order_id)?;
        let call = LedgerCall::DeclineOrderRequest {
            order_id: order_id.to_string(),
        };
        self.execute_write(call, |s| {
            Self::patch_order(s, order_id, |o| o.request_status = RequestStatus::Declined)
        })
        .await
    }

    async fn respond_to_order_request(
        &self,
        order_id: &str,
        response: OrderResponse,
    ) -> Result<TxHash, SyncError> {
        match response {
            OrderResponse::Accept {
                price,
                delivery_date,
            } => {
                self.accept_order_request(order_id, &price, delivery_date)
                    .await
            }
            OrderResponse::Decline => self.decline_order_request(order_id).await,
        }
    }

    async fn start_shipment(&self, order_id: &str, carrier_id: &str) -> Result<TxHash, SyncError> {
        require_non_empty("orderId", order_id)?;
        require_non_empty("carrierId", carrier_id)?;
        let call = LedgerCall::StartShipment {
            order_id: order_id.to_string(),
            carrier_id: carrier_id.to_string(),
        };
        self.execute_write(call, |s| {
            Self::patch_order(s, order_id, |o| {
                o.shipment_status = ShipmentStatus::InTransit;
                o.carrier_id = Some(carrier_id.to_string());
            })
        })
        .await
    }

    async fn complete_shipment(&self, order_id: &str) -> Result<TxHash, SyncError> {
        require_non_empty("orderId", order_id)?;
        let call = LedgerCall::CompleteShipment {
            order_id: order_id.to_string(),
        };
        self.execute_write(call, |s| {
            Self::patch_order(s, order_id, |o| {
                o.shipment_status = ShipmentStatus::Delivered;
                o.is_paid = true;
            })
        })
        .await
    }

    async fn update_user_location(&self, location: Coordinates) -> Result<TxHash, SyncError> {
        let location = Coordinates::new(location.lat, location.lng)?;
        let (lat, lng) = units::encode_position(&location);
        self.execute_write(LedgerCall::UpdateUserLocation { lat, lng }, move |s| {
            s.user_location = units::decode_location(lat, lng);
        })
        .await
    }

    async fn record_carbon_emission(
        &self,
        mut emission: CarbonEmission,
    ) -> Result<TxHash, SyncError> {
        let call = LedgerCall::record_carbon_emission(&emission)?;
        if let LedgerCall::RecordCarbonEmission {
            emissions,
            distance,
            ..
        } = &call
        {
            emission.emissions = units::grams_to_kg(*emissions);
            emission.distance = units::meters_to_km(*distance);
        }
        emission.timestamp.get_or_insert_with(Utc::now);
        self.execute_write(call, move |s| s.upsert_emission(emission))
            .await
    }

    async fn record_delay_prediction(
        &self,
        mut prediction: DelayPrediction,
    ) -> Result<TxHash, SyncError> {
        let call = LedgerCall::record_delay_prediction(&prediction)?;
        if let LedgerCall::RecordDelayPrediction {
            probability,
            estimated_delay,
            ..
        } = &call
        {
            prediction.probability = units::percent_to_probability(*probability);
            prediction.estimated_delay = *estimated_delay as f64;
        }
        prediction.timestamp.get_or_insert_with(Utc::now);
        self.execute_write(call, move |s| s.upsert_prediction(prediction))
            .await
    }

    fn snapshot(&self) -> Arc<ViewSnapshot> {
        Arc::clone(&self.snapshot.borrow())
    }

    fn watch(&self) -> watch::Receiver<Arc<ViewSnapshot>> {
        self.snapshot.subscribe()
    }
}
