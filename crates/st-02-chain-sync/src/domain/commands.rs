//! # Write Commands
//!
//! Validated inputs for ledger writes, the encoded ledger calls they turn
//! into, and the receipts that come back.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::{
    require_non_empty, CarbonEmission, Coordinates, DelayPrediction, PartnerType, TransportType,
    TxHash, ValidationError, WalletAddress, U256,
};
use uuid::Uuid;

use super::units;

// =============================================================================
// INPUTS
// =============================================================================

/// A partner registration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPartner {
    /// Partner id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Importer or exporter.
    pub partner_type: PartnerType,
    /// Location.
    pub position: Coordinates,
    /// Partner account.
    pub wallet_address: WalletAddress,
}

impl NewPartner {
    /// Build from raw form fields.
    pub fn from_form(
        id: &str,
        name: &str,
        partner_type: &str,
        lat: &str,
        lng: &str,
        wallet_address: &str,
    ) -> Result<Self, ValidationError> {
        require_non_empty("id", id)?;
        require_non_empty("name", name)?;
        Ok(Self {
            id: id.trim().to_string(),
            name: name.trim().to_string(),
            partner_type: partner_type.parse()?,
            position: Coordinates::parse(lat, lng)?,
            wallet_address: WalletAddress::parse(wallet_address)?,
        })
    }
}

/// A new order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// Order id.
    pub id: String,
    /// Supplying partner.
    pub supplier_id: String,
    /// Product.
    pub product_id: String,
    /// Mode of transport.
    pub transport_type: TransportType,
}

impl NewOrder {
    /// An order with a freshly generated `ORD-` id.
    pub fn new(
        supplier_id: impl Into<String>,
        product_id: impl Into<String>,
        transport_type: TransportType,
    ) -> Self {
        let suffix = Uuid::new_v4().simple().to_string();
        Self {
            id: format!("ORD-{}", suffix[..8].to_uppercase()),
            supplier_id: supplier_id.into(),
            product_id: product_id.into(),
            transport_type,
        }
    }

    /// Use a caller-chosen id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// A supplier's answer to an order request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderResponse {
    /// Accept at `price` (decimal display unit) for delivery on `delivery_date`.
    Accept {
        /// Decimal price, e.g. `"1.5"`.
        price: String,
        /// Agreed delivery date.
        delivery_date: NaiveDate,
    },
    /// Decline.
    Decline,
}

/// Carbon calculator output for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEstimate {
    /// Order id.
    pub order_id: String,
    /// kg CO2.
    pub emissions: f64,
    /// km.
    pub distance: f64,
    /// Transport mode as the calculator names it.
    pub transport_type: String,
}

impl CarbonEstimate {
    /// The emission row to record. The ledger stamps the time.
    pub fn into_emission(self) -> CarbonEmission {
        CarbonEmission {
            order_id: self.order_id,
            emissions: self.emissions,
            distance: self.distance,
            transport_type: self.transport_type,
            timestamp: None,
        }
    }
}

// =============================================================================
// LEDGER CALLS
// =============================================================================

/// A write to the ledger with arguments already in ledger units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCall {
    /// `addPartner`.
    AddPartner {
        /// Partner id.
        id: String,
        /// Name.
        name: String,
        /// Type string.
        partner_type: String,
        /// Micro-degrees.
        lat: i64,
        /// Micro-degrees.
        lng: i64,
        /// Account.
        wallet_address: String,
    },
    /// `createOrder`.
    CreateOrder {
        /// Order id.
        id: String,
        /// Supplier.
        supplier_id: String,
        /// Product.
        product_id: String,
        /// Transport string.
        transport_type: String,
    },
    /// `acceptOrderRequest`.
    AcceptOrderRequest {
        /// Order id.
        order_id: String,
        /// Smallest price unit.
        price: U256,
        /// Unix seconds.
        delivery_date: u64,
    },
    /// `declineOrderRequest`.
    DeclineOrderRequest {
        /// Order id.
        order_id: String,
    },
    /// `startShipment`.
    StartShipment {
        /// Order id.
        order_id: String,
        /// Carrier.
        carrier_id: String,
    },
    /// `completeShipment`.
    CompleteShipment {
        /// Order id.
        order_id: String,
    },
    /// `updateUserLocation`.
    UpdateUserLocation {
        /// Micro-degrees.
        lat: i64,
        /// Micro-degrees.
        lng: i64,
    },
    /// `recordCarbonEmission`.
    RecordCarbonEmission {
        /// Order id.
        order_id: String,
        /// Grams.
        emissions: u64,
        /// Meters.
        distance: u64,
        /// Transport string.
        transport_type: String,
    },
    /// `recordDelayPrediction`.
    RecordDelayPrediction {
        /// Order id.
        order_id: String,
        /// Percent.
        probability: u64,
        /// Cause.
        reason: String,
        /// Whole hours.
        estimated_delay: u64,
    },
}

impl LedgerCall {
    /// Contract method name.
    pub fn method(&self) -> &'static str {
        match self {
            LedgerCall::AddPartner { .. } => "addPartner",
            LedgerCall::CreateOrder { .. } => "createOrder",
            LedgerCall::AcceptOrderRequest { .. } => "acceptOrderRequest",
            LedgerCall::DeclineOrderRequest { .. } => "declineOrderRequest",
            LedgerCall::StartShipment { .. } => "startShipment",
            LedgerCall::CompleteShipment { .. } => "completeShipment",
            LedgerCall::UpdateUserLocation { .. } => "updateUserLocation",
            LedgerCall::RecordCarbonEmission { .. } => "recordCarbonEmission",
            LedgerCall::RecordDelayPrediction { .. } => "recordDelayPrediction",
        }
    }

    /// Encode a partner registration.
    pub fn add_partner(partner: &NewPartner) -> Self {
        let (lat, lng) = units::encode_position(&partner.position);
        LedgerCall::AddPartner {
            id: partner.id.clone(),
            name: partner.name.clone(),
            partner_type: partner.partner_type.as_str().to_string(),
            lat,
            lng,
            wallet_address: partner.wallet_address.to_string(),
        }
    }

    /// Encode an emission row.
    pub fn record_carbon_emission(emission: &CarbonEmission) -> Result<Self, ValidationError> {
        require_non_empty("orderId", &emission.order_id)?;
        Ok(LedgerCall::RecordCarbonEmission {
            order_id: emission.order_id.clone(),
            emissions: units::kg_to_grams(emission.emissions)?,
            distance: units::km_to_meters(emission.distance)?,
            transport_type: emission.transport_type.clone(),
        })
    }

    /// Encode a delay prediction.
    pub fn record_delay_prediction(prediction: &DelayPrediction) -> Result<Self, ValidationError> {
        require_non_empty("orderId", &prediction.order_id)?;
        Ok(LedgerCall::RecordDelayPrediction {
            order_id: prediction.order_id.clone(),
            probability: units::probability_to_percent(prediction.probability)?,
            reason: prediction.reason.clone(),
            estimated_delay: units::hours_to_wire(prediction.estimated_delay)?,
        })
    }
}

/// Outcome of a mined transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// False when the transaction reverted.
    pub success: bool,
    /// Confirmations observed.
    pub confirmations: u64,
}
