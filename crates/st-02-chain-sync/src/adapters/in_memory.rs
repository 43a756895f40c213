//! In-memory ledger.
//!
//! A simulated trade contract. Writes are executed at submission and
//! reverted when they reference an unknown order, the way the contract's
//! `require` checks behave. Faults can be injected per read collection and
//! for submission or confirmation.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use shared_types::{TxHash, WalletAddress, U256};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::{
    EmissionRecord, LedgerCall, OrderRecord, PartnerRecord, PredictionRecord, SyncError,
    TxReceipt,
};
use crate::ports::LedgerClient;

/// Where an injected failure applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerFault {
    /// Partner count and reads.
    Partners,
    /// Order count and reads.
    Orders,
    /// Emission count and reads.
    Emissions,
    /// Prediction count and reads.
    Predictions,
    /// `get_user_location`.
    Location,
    /// `submit`.
    Submit,
    /// `wait_for_confirmation`.
    Confirmation,
}

#[derive(Debug, Default)]
struct LedgerState {
    partners: Vec<PartnerRecord>,
    orders: Vec<OrderRecord>,
    emissions: Vec<EmissionRecord>,
    predictions: Vec<PredictionRecord>,
    locations: HashMap<WalletAddress, (i64, i64)>,
    receipts: HashMap<TxHash, bool>,
    submitted: Vec<LedgerCall>,
    nonce: u64,
    faults: HashSet<LedgerFault>,
    revert_next: bool,
    reject_next: Option<String>,
    read_delay: Option<Duration>,
}

impl LedgerState {
    fn check(&self, fault: LedgerFault) -> Result<(), SyncError> {
        if self.faults.contains(&fault) {
            return Err(SyncError::Network(format!("simulated {fault:?} failure")));
        }
        Ok(())
    }

    fn order_mut(&mut self, id: &str) -> Option<&mut OrderRecord> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    /// Execute `call`. `false` means the contract reverted.
    fn execute(&mut self, from: &WalletAddress, call: &LedgerCall) -> bool {
        let now = Utc::now().timestamp().max(0) as u64;
        match call.clone() {
            LedgerCall::AddPartner {
                id,
                name,
                partner_type,
                lat,
                lng,
                wallet_address,
            } => {
                if self.partners.iter().any(|p| p.id == id) {
                    return false;
                }
                self.partners.push(PartnerRecord {
                    id,
                    name,
                    partner_type,
                    lat,
                    lng,
                    wallet_address,
                });
            }
            LedgerCall::CreateOrder {
                id,
                supplier_id,
                product_id,
                transport_type,
            } => {
                if self.orders.iter().any(|o| o.id == id) {
                    return false;
                }
                self.orders.push(OrderRecord {
                    id,
                    supplier_id,
                    product_id,
                    order_date: now,
                    delivery_date: 0,
                    price: U256::zero(),
                    is_paid: false,
                    shipment_status: "Pending".to_string(),
                    request_status: "Pending".to_string(),
                    carrier_id: String::new(),
                    transport_type,
                });
            }
            LedgerCall::AcceptOrderRequest {
                order_id,
                price,
                delivery_date,
            } => match self.order_mut(&order_id) {
                Some(order) if order.request_status == "Pending" => {
                    order.request_status = "Approved".to_string();
                    order.price = price;
                    order.delivery_date = delivery_date;
                }
                _ => return false,
            },
            LedgerCall::DeclineOrderRequest { order_id } => match self.order_mut(&order_id) {
                Some(order) if order.request_status == "Pending" => {
                    order.request_status = "Declined".to_string();
                }
                _ => return false,
            },
            LedgerCall::StartShipment {
                order_id,
                carrier_id,
            } => match self.order_mut(&order_id) {
                Some(order) if order.request_status == "Approved" => {
                    order.shipment_status = "In Transit".to_string();
                    order.carrier_id = carrier_id;
                }
                _ => return false,
            },
            LedgerCall::CompleteShipment { order_id } => match self.order_mut(&order_id) {
                Some(order) => {
                    order.shipment_status = "Delivered".to_string();
                    order.is_paid = true;
                }
                None => return false,
            },
            LedgerCall::UpdateUserLocation { lat, lng } => {
                self.locations.insert(from.clone(), (lat, lng));
            }
            LedgerCall::RecordCarbonEmission {
                order_id,
                emissions,
                distance,
                transport_type,
            } => {
                let record = EmissionRecord {
                    order_id,
                    emissions,
                    distance,
                    transport_type,
                    timestamp: now,
                };
                match self
                    .emissions
                    .iter_mut()
                    .find(|e| e.order_id == record.order_id)
                {
                    Some(existing) => *existing = record,
                    None => self.emissions.push(record),
                }
            }
            LedgerCall::RecordDelayPrediction {
                order_id,
                probability,
                reason,
                estimated_delay,
            } => {
                if probability > 100 {
                    return false;
                }
                let record = PredictionRecord {
                    order_id,
                    probability,
                    reason,
                    estimated_delay,
                    timestamp: now,
                };
                match self
                    .predictions
                    .iter_mut()
                    .find(|p| p.order_id == record.order_id)
                {
                    Some(existing) => *existing = record,
                    None => self.predictions.push(record),
                }
            }
        }
        true
    }
}

/// In-memory `LedgerClient` with fault injection.
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger seeded with a few partners and orders.
    pub fn with_demo_data() -> Self {
        let ledger = Self::new();
        {
            let mut state = ledger.state.lock();
            state.partners = vec![
                PartnerRecord {
                    id: "SUPP-001".to_string(),
                    name: "Pacific Exports".to_string(),
                    partner_type: "Exporter".to_string(),
                    lat: 37_774_900,
                    lng: -122_419_400,
                    wallet_address: format!("0x{}", "1a".repeat(20)),
                },
                PartnerRecord {
                    id: "IMP-001".to_string(),
                    name: "Harbor Imports".to_string(),
                    partner_type: "Importer".to_string(),
                    lat: 34_052_200,
                    lng: -118_243_700,
                    wallet_address: format!("0x{}", "2b".repeat(20)),
                },
            ];
            state.orders = vec![
                OrderRecord {
                    id: "ORD-1001".to_string(),
                    supplier_id: "SUPP-001".to_string(),
                    product_id: "PROD-A101".to_string(),
                    order_date: 1_709_251_200,
                    delivery_date: 1_711_929_600,
                    price: U256::exp10(18),
                    is_paid: false,
                    shipment_status: "In Transit".to_string(),
                    request_status: "Approved".to_string(),
                    carrier_id: "CARR-01".to_string(),
                    transport_type: "Truck".to_string(),
                },
                OrderRecord {
                    id: "ORD-1002".to_string(),
                    supplier_id: "SUPP-001".to_string(),
                    product_id: "PROD-B202".to_string(),
                    order_date: 1_709_337_600,
                    delivery_date: 0,
                    price: U256::zero(),
                    is_paid: false,
                    shipment_status: "Pending".to_string(),
                    request_status: "Pending".to_string(),
                    carrier_id: String::new(),
                    transport_type: "Ship".to_string(),
                },
            ];
        }
        ledger
    }

    /// Seed a partner row.
    pub fn push_partner(&self, record: PartnerRecord) {
        self.state.lock().partners.push(record);
    }

    /// Seed an order row.
    pub fn push_order(&self, record: OrderRecord) {
        self.state.lock().orders.push(record);
    }

    /// Seed an emission row.
    pub fn push_emission(&self, record: EmissionRecord) {
        self.state.lock().emissions.push(record);
    }

    /// Seed a prediction row.
    pub fn push_prediction(&self, record: PredictionRecord) {
        self.state.lock().predictions.push(record);
    }

    /// Seed a stored location.
    pub fn set_location(&self, user: WalletAddress, lat: i64, lng: i64) {
        self.state.lock().locations.insert(user, (lat, lng));
    }

    /// Start failing at `fault`.
    pub fn inject_fault(&self, fault: LedgerFault) {
        self.state.lock().faults.insert(fault);
    }

    /// Stop failing at `fault`.
    pub fn clear_fault(&self, fault: LedgerFault) {
        self.state.lock().faults.remove(&fault);
    }

    /// Make the next submitted transaction revert.
    pub fn revert_next(&self) {
        self.state.lock().revert_next = true;
    }

    /// Make the wallet refuse to sign the next transaction.
    pub fn reject_next_signature(&self, message: impl Into<String>) {
        self.state.lock().reject_next = Some(message.into());
    }

    /// Delay every read by `delay`.
    pub fn set_read_delay(&self, delay: Option<Duration>) {
        self.state.lock().read_delay = delay;
    }

    /// Calls submitted so far, reverted ones included.
    pub fn submitted_calls(&self) -> Vec<LedgerCall> {
        self.state.lock().submitted.clone()
    }

    /// Raw order row.
    pub fn order_record(&self, id: &str) -> Option<OrderRecord> {
        self.state.lock().orders.iter().find(|o| o.id == id).cloned()
    }

    async fn read<T>(
        &self,
        fault: LedgerFault,
        f: impl FnOnce(&LedgerState) -> Result<T, SyncError>,
    ) -> Result<T, SyncError> {
        let delay = self.state.lock().read_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock();
        state.check(fault)?;
        f(&state)
    }
}

fn at<T: Clone>(rows: &[T], index: u64, what: &str) -> Result<T, SyncError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| rows.get(i))
        .cloned()
        .ok_or_else(|| SyncError::Network(format!("{what} index {index} out of bounds")))
}

fn tx_hash(nonce: u64) -> TxHash {
    let mut bytes = [0u8; 32];
    bytes[0] = 0x5c;
    bytes[24..].copy_from_slice(&nonce.to_be_bytes());
    TxHash(bytes)
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn partners_count(&self) -> Result<u64, SyncError> {
        self.read(LedgerFault::Partners, |s| Ok(s.partners.len() as u64))
            .await
    }

    async fn partner_at(&self, index: u64) -> Result<PartnerRecord, SyncError> {
        self.read(LedgerFault::Partners, |s| at(&s.partners, index, "partner"))
            .await
    }

    async fn orders_count(&self) -> Result<u64, SyncError> {
        self.read(LedgerFault::Orders, |s| Ok(s.orders.len() as u64))
            .await
    }

    async fn order_at(&self, index: u64) -> Result<OrderRecord, SyncError> {
        self.read(LedgerFault::Orders, |s| at(&s.orders, index, "order"))
            .await
    }

    async fn carbon_emissions_count(&self) -> Result<u64, SyncError> {
        self.read(LedgerFault::Emissions, |s| Ok(s.emissions.len() as u64))
            .await
    }

    async fn carbon_emission_at(&self, index: u64) -> Result<EmissionRecord, SyncError> {
        self.read(LedgerFault::Emissions, |s| at(&s.emissions, index, "emission"))
            .await
    }

    async fn delay_predictions_count(&self) -> Result<u64, SyncError> {
        self.read(LedgerFault::Predictions, |s| Ok(s.predictions.len() as u64))
            .await
    }

    async fn delay_prediction_at(&self, index: u64) -> Result<PredictionRecord, SyncError> {
        self.read(LedgerFault::Predictions, |s| {
            at(&s.predictions, index, "prediction")
        })
        .await
    }

    async fn get_user_location(&self, user: &WalletAddress) -> Result<(i64, i64), SyncError> {
        self.read(LedgerFault::Location, |s| {
            Ok(s.locations.get(user).copied().unwrap_or((0, 0)))
        })
        .await
    }

    async fn submit(&self, from: &WalletAddress, call: LedgerCall) -> Result<TxHash, SyncError> {
        let mut state = self.state.lock();
        state.check(LedgerFault::Submit)?;
        if let Some(message) = state.reject_next.take() {
            return Err(SyncError::Wallet(message));
        }

        state.nonce += 1;
        let tx = tx_hash(state.nonce);
        let success = if std::mem::take(&mut state.revert_next) {
            false
        } else {
            state.execute(from, &call)
        };
        if success {
            debug!(tx = %tx, method = call.method(), "[st-02] Simulated ledger executed call");
        } else {
            warn!(tx = %tx, method = call.method(), "[st-02] Simulated ledger reverted call");
        }
        state.receipts.insert(tx, success);
        state.submitted.push(call);
        Ok(tx)
    }

    async fn wait_for_confirmation(
        &self,
        tx: TxHash,
        confirmations: u64,
    ) -> Result<TxReceipt, SyncError> {
        let state = self.state.lock();
        state.check(LedgerFault::Confirmation)?;
        let success = state
            .receipts
            .get(&tx)
            .copied()
            .ok_or_else(|| SyncError::Network(format!("unknown transaction {tx}")))?;
        Ok(TxReceipt {
            tx_hash: tx,
            success,
            confirmations,
        })
    }
}
