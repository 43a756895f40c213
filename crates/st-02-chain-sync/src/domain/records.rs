//! # Ledger Records
//!
//! Rows exactly as the ledger stores them, and their decoding into the
//! dashboard entities.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared_types::{
    CarbonEmission, DelayPrediction, Order, Partner, TransportType, ValidationError,
    WalletAddress, U256,
};

use super::units;

/// A partner row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRecord {
    /// Partner id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// `"Importer"` or `"Exporter"`.
    pub partner_type: String,
    /// Latitude in micro-degrees.
    pub lat: i64,
    /// Longitude in micro-degrees.
    pub lng: i64,
    /// Partner account.
    pub wallet_address: String,
}

impl PartnerRecord {
    /// Decode into a `Partner`. The ledger keeps no registration date, so
    /// `created_at` is supplied by the reader.
    pub fn decode(self, created_at: NaiveDate) -> Result<Partner, ValidationError> {
        Ok(Partner {
            partner_type: self.partner_type.parse()?,
            position: shared_types::Coordinates {
                lat: units::decode_coordinate(self.lat),
                lng: units::decode_coordinate(self.lng),
            },
            wallet_address: WalletAddress::parse(&self.wallet_address)?,
            id: self.id,
            name: self.name,
            created_at,
        })
    }
}

/// An order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Order id.
    pub id: String,
    /// Supplying partner.
    pub supplier_id: String,
    /// Product.
    pub product_id: String,
    /// Unix seconds.
    pub order_date: u64,
    /// Unix seconds; 0 until accepted.
    pub delivery_date: u64,
    /// Smallest price unit; 0 until accepted.
    pub price: U256,
    /// Paid on completion.
    pub is_paid: bool,
    /// Shipment status string.
    pub shipment_status: String,
    /// Request status string.
    pub request_status: String,
    /// Empty until shipping.
    pub carrier_id: String,
    /// Transport string; empty on rows written before it was stored.
    pub transport_type: String,
}

impl OrderRecord {
    /// Decode into an `Order`.
    pub fn decode(self, price_decimals: u32) -> Result<Order, ValidationError> {
        let order_date = units::unix_to_date(self.order_date)
            .ok_or_else(|| ValidationError::new("orderDate", "missing"))?;
        let transport_type = if self.transport_type.is_empty() {
            TransportType::Truck
        } else {
            self.transport_type.parse()?
        };

        Ok(Order {
            order_date,
            delivery_date: units::unix_to_date(self.delivery_date),
            price: units::decode_price(self.price, price_decimals),
            is_paid: self.is_paid,
            shipment_status: self.shipment_status.parse()?,
            request_status: self.request_status.parse()?,
            carrier_id: Some(self.carrier_id).filter(|c| !c.is_empty()),
            transport_type,
            id: self.id,
            supplier_id: self.supplier_id,
            product_id: self.product_id,
        })
    }
}

/// A carbon emission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionRecord {
    /// Order id.
    pub order_id: String,
    /// Grams CO2.
    pub emissions: u64,
    /// Meters.
    pub distance: u64,
    /// Transport mode as reported.
    pub transport_type: String,
    /// Unix seconds.
    pub timestamp: u64,
}

impl EmissionRecord {
    /// Decode into a `CarbonEmission`.
    pub fn decode(self) -> CarbonEmission {
        CarbonEmission {
            order_id: self.order_id,
            emissions: units::grams_to_kg(self.emissions),
            distance: units::meters_to_km(self.distance),
            transport_type: self.transport_type,
            timestamp: units::unix_to_datetime(self.timestamp),
        }
    }
}

/// A delay prediction row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    /// Order id.
    pub order_id: String,
    /// Percent, 0..=100.
    pub probability: u64,
    /// Cause.
    pub reason: String,
    /// Whole hours.
    pub estimated_delay: u64,
    /// Unix seconds.
    pub timestamp: u64,
}

impl PredictionRecord {
    /// Decode into a `DelayPrediction`.
    pub fn decode(self) -> DelayPrediction {
        DelayPrediction {
            order_id: self.order_id,
            probability: units::percent_to_probability(self.probability),
            reason: self.reason,
            estimated_delay: self.estimated_delay as f64,
            timestamp: units::unix_to_datetime(self.timestamp),
        }
    }
}
