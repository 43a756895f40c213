//! # Core Domain Entities
//!
//! Defines the trade entities the dashboard shows and the identity types
//! used to talk to the wallet and the ledger.
//!
//! ## Clusters
//!
//! - **Identity**: `WalletAddress`, `TxHash`, `ChainId`
//! - **Geography**: `Coordinates`
//! - **Trade**: `Partner`, `Order` and their status vocabularies
//! - **Insights**: `CarbonEmission`, `DelayPrediction`

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

// Re-export U256 from primitive-types for ledger amounts
pub use primitive_types::U256;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// EIP-155 chain identifier reported by the wallet provider.
pub type ChainId = u64;

/// A 20-byte account address in `0x`-prefixed lower-case hex form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Parse an address, accepting any hex casing.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ValidationError::new("walletAddress", "missing 0x prefix"))?;

        if body.len() != 40 {
            return Err(ValidationError::new(
                "walletAddress",
                format!("expected 40 hex digits, got {}", body.len()),
            ));
        }
        if hex::decode(body).is_err() {
            return Err(ValidationError::new("walletAddress", "not hexadecimal"));
        }

        Ok(Self(format!("0x{}", body.to_ascii_lowercase())))
    }

    /// The normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for WalletAddress {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

/// A 32-byte transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// Hex form with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for TxHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.trim().trim_start_matches("0x");
        let bytes = hex::decode(body)
            .map_err(|e| ValidationError::new("txHash", e.to_string()))?;
        let array: [u8; 32] = bytes
            .try_into()
            .map_err(|_| ValidationError::new("txHash", "expected 32 bytes"))?;
        Ok(Self(array))
    }
}

// =============================================================================
// CLUSTER B: GEOGRAPHY
// =============================================================================

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude, -90..=90.
    pub lat: f64,
    /// Longitude, -180..=180.
    pub lng: f64,
}

impl Coordinates {
    /// Build a validated position.
    pub fn new(lat: f64, lng: f64) -> Result<Self, ValidationError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(ValidationError::new("lat", format!("{lat} is not a latitude")));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(ValidationError::new("lng", format!("{lng} is not a longitude")));
        }
        Ok(Self { lat, lng })
    }

    /// Parse a position from raw form input.
    pub fn parse(lat: &str, lng: &str) -> Result<Self, ValidationError> {
        let lat = lat
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::new("lat", format!("'{lat}' is not a number")))?;
        let lng = lng
            .trim()
            .parse::<f64>()
            .map_err(|_| ValidationError::new("lng", format!("'{lng}' is not a number")))?;
        Self::new(lat, lng)
    }

    /// True for exactly (0, 0).
    pub fn is_origin(&self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }
}

// =============================================================================
// CLUSTER C: TRADE
// =============================================================================

/// Role of a trading partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartnerType {
    /// Receives goods.
    Importer,
    /// Ships goods.
    Exporter,
}

impl PartnerType {
    /// Ledger string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            PartnerType::Importer => "Importer",
            PartnerType::Exporter => "Exporter",
        }
    }
}

impl FromStr for PartnerType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Importer" => Ok(PartnerType::Importer),
            "Exporter" => Ok(PartnerType::Exporter),
            other => Err(ValidationError::new("partnerType", format!("unknown '{other}'"))),
        }
    }
}

/// Physical progress of an order's shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    /// Not yet picked up.
    Pending,
    /// Collected by the carrier.
    PickedUp,
    /// On its way.
    InTransit,
    /// Behind schedule.
    Delayed,
    /// Arrived; payment released.
    Delivered,
}

impl ShipmentStatus {
    /// Ledger string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "Pending",
            ShipmentStatus::PickedUp => "Picked Up",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::Delayed => "Delayed",
            ShipmentStatus::Delivered => "Delivered",
        }
    }

    /// Picked up, in transit or delayed.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            ShipmentStatus::PickedUp | ShipmentStatus::InTransit | ShipmentStatus::Delayed
        )
    }
}

impl FromStr for ShipmentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ShipmentStatus::Pending),
            "Picked Up" => Ok(ShipmentStatus::PickedUp),
            "In Transit" => Ok(ShipmentStatus::InTransit),
            "Delayed" => Ok(ShipmentStatus::Delayed),
            "Delivered" => Ok(ShipmentStatus::Delivered),
            other => Err(ValidationError::new("shipmentStatus", format!("unknown '{other}'"))),
        }
    }
}

/// Supplier's answer to an order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Awaiting the supplier.
    Pending,
    /// Accepted with a price and delivery date.
    Approved,
    /// Refused.
    Declined,
}

impl RequestStatus {
    /// Ledger string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Approved => "Approved",
            RequestStatus::Declined => "Declined",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RequestStatus::Pending),
            "Approved" => Ok(RequestStatus::Approved),
            "Declined" => Ok(RequestStatus::Declined),
            other => Err(ValidationError::new("requestStatus", format!("unknown '{other}'"))),
        }
    }
}

/// Mode of transport for a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportType {
    /// Road freight.
    Truck,
    /// Sea freight.
    Ship,
    /// Air freight.
    Plane,
    /// Rail freight.
    Train,
}

impl TransportType {
    /// Ledger string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportType::Truck => "Truck",
            TransportType::Ship => "Ship",
            TransportType::Plane => "Plane",
            TransportType::Train => "Train",
        }
    }
}

impl FromStr for TransportType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Truck" => Ok(TransportType::Truck),
            "Ship" => Ok(TransportType::Ship),
            "Plane" => Ok(TransportType::Plane),
            "Train" => Ok(TransportType::Train),
            other => Err(ValidationError::new("transportType", format!("unknown '{other}'"))),
        }
    }
}

/// A registered importer or exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    /// Partner identifier chosen at registration (e.g. `SUPP-001`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Importer or exporter.
    #[serde(rename = "type")]
    pub partner_type: PartnerType,
    /// Registered location.
    pub position: Coordinates,
    /// Partner's account.
    pub wallet_address: WalletAddress,
    /// Registration date.
    pub created_at: NaiveDate,
}

/// An order between a buyer and a supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier.
    pub id: String,
    /// Supplying partner's id.
    pub supplier_id: String,
    /// Product identifier.
    pub product_id: String,
    /// Date the order was created.
    pub order_date: NaiveDate,
    /// Agreed delivery date, once accepted.
    pub delivery_date: Option<NaiveDate>,
    /// Agreed price in the display unit, once accepted.
    pub price: Option<f64>,
    /// Set only by a confirmed shipment completion.
    pub is_paid: bool,
    /// Shipment progress.
    pub shipment_status: ShipmentStatus,
    /// Supplier's answer.
    pub request_status: RequestStatus,
    /// Assigned carrier, once shipping.
    pub carrier_id: Option<String>,
    /// Mode of transport.
    pub transport_type: TransportType,
}

// =============================================================================
// CLUSTER D: INSIGHTS
// =============================================================================

/// Carbon footprint of one order's shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonEmission {
    /// Order this row belongs to.
    pub order_id: String,
    /// Emissions in kg CO2.
    pub emissions: f64,
    /// Distance in km.
    pub distance: f64,
    /// Transport mode as reported by the calculator.
    pub transport_type: String,
    /// When the row was recorded on the ledger.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Probability that an order arrives late.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayPrediction {
    /// Order this prediction belongs to.
    pub order_id: String,
    /// Probability of delay in [0, 1].
    pub probability: f64,
    /// Human readable cause.
    pub reason: String,
    /// Expected delay in hours.
    pub estimated_delay: f64,
    /// When the prediction was made.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_address_normalizes_case() {
        let addr = WalletAddress::parse("0xABCDEFabcdef0123456789ABCDEF0123456789ab").unwrap();
        assert_eq!(addr.as_str(), "0xabcdefabcdef0123456789abcdef0123456789ab");
    }

    #[test]
    fn test_wallet_address_rejects_malformed() {
        assert!(WalletAddress::parse("abcdef").is_err());
        assert!(WalletAddress::parse("0x1234").is_err());
        assert!(WalletAddress::parse("0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_wallet_address_serde_is_a_string() {
        let addr = WalletAddress::parse("0x00000000000000000000000000000000000000aa").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0x00000000000000000000000000000000000000aa\"");
        let bad: Result<WalletAddress, _> = serde_json::from_str("\"nope\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_tx_hash_hex_round_trip() {
        let hash = TxHash([0xab; 32]);
        let parsed: TxHash = hash.to_hex().parse().unwrap();
        assert_eq!(parsed, hash);
    }

    #[test]
    fn test_coordinates_parse() {
        let c = Coordinates::parse("37.7749", " -122.4194 ").unwrap();
        assert_eq!(c.lat, 37.7749);
        assert_eq!(c.lng, -122.4194);
    }

    #[test]
    fn test_coordinates_reject_non_numeric_and_out_of_range() {
        assert_eq!(Coordinates::parse("north", "1").unwrap_err().field, "lat");
        assert_eq!(Coordinates::new(10.0, 181.0).unwrap_err().field, "lng");
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_shipment_status_ledger_strings() {
        for status in [
            ShipmentStatus::Pending,
            ShipmentStatus::PickedUp,
            ShipmentStatus::InTransit,
            ShipmentStatus::Delayed,
            ShipmentStatus::Delivered,
        ] {
            assert_eq!(status.as_str().parse::<ShipmentStatus>().unwrap(), status);
        }
        assert_eq!(ShipmentStatus::InTransit.as_str(), "In Transit");
        assert!("in transit".parse::<ShipmentStatus>().is_err());
    }

    #[test]
    fn test_active_shipments() {
        assert!(ShipmentStatus::PickedUp.is_active());
        assert!(ShipmentStatus::Delayed.is_active());
        assert!(!ShipmentStatus::Pending.is_active());
        assert!(!ShipmentStatus::Delivered.is_active());
    }

    #[test]
    fn test_partner_serializes_in_dashboard_shape() {
        let partner = Partner {
            id: "SUPP-001".into(),
            name: "Acme".into(),
            partner_type: PartnerType::Exporter,
            position: Coordinates { lat: 1.0, lng: 2.0 },
            wallet_address: WalletAddress::parse("0x00000000000000000000000000000000000000aa")
                .unwrap(),
            created_at: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        };
        let json = serde_json::to_value(&partner).unwrap();
        assert_eq!(json["type"], "Exporter");
        assert_eq!(json["walletAddress"], "0x00000000000000000000000000000000000000aa");
        assert_eq!(json["createdAt"], "2024-05-01");
    }
}
