//! # Derived Projections
//!
//! Pure functions over snapshot collections. Nothing here is cached; every
//! call recomputes from its inputs.

use serde::Serialize;
use shared_types::{Coordinates, Order, Partner, PartnerType, RequestStatus, ShipmentStatus};

/// Id of the connected account's own marker.
pub const USER_MARKER_ID: &str = "user-1";

/// Label of the connected account's own marker.
pub const USER_MARKER_LABEL: &str = "HQ";

/// What a marker stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MarkerKind {
    /// The connected account.
    User,
    /// A registered partner.
    Partner {
        /// Importer or exporter.
        #[serde(rename = "partnerType")]
        partner_type: PartnerType,
    },
    /// A shipment in transit.
    Carrier {
        /// Order being carried.
        #[serde(rename = "orderId")]
        order_id: String,
    },
}

/// A point on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Unique id.
    pub id: String,
    /// Where to draw it.
    pub position: Coordinates,
    /// What it is.
    #[serde(flatten)]
    pub kind: MarkerKind,
    /// Display label.
    pub label: String,
}

/// Markers in display order: the user, then partners, then carriers.
///
/// A carrier marker needs an `InTransit` order with a carrier whose supplier
/// is a known partner; it is drawn at that supplier's position.
pub fn derive_markers(
    user_location: Option<&Coordinates>,
    partners: &[Partner],
    orders: &[Order],
) -> Vec<MapMarker> {
    let mut markers = Vec::with_capacity(1 + partners.len());

    if let Some(position) = user_location {
        markers.push(MapMarker {
            id: USER_MARKER_ID.to_string(),
            position: *position,
            kind: MarkerKind::User,
            label: USER_MARKER_LABEL.to_string(),
        });
    }

    markers.extend(partners.iter().map(|partner| MapMarker {
        id: partner.id.clone(),
        position: partner.position,
        kind: MarkerKind::Partner {
            partner_type: partner.partner_type,
        },
        label: partner.name.clone(),
    }));

    markers.extend(orders.iter().filter_map(|order| {
        if order.shipment_status != ShipmentStatus::InTransit {
            return None;
        }
        let carrier_id = order.carrier_id.as_ref()?;
        let supplier = partners.iter().find(|p| p.id == order.supplier_id)?;
        Some(MapMarker {
            id: format!("carrier-{carrier_id}"),
            position: supplier.position,
            kind: MarkerKind::Carrier {
                order_id: order.id.clone(),
            },
            label: format!("Shipment {}", order.id),
        })
    }));

    markers
}

/// Shipment counts for the dashboard summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentSummary {
    /// Delivered.
    pub completed: usize,
    /// Picked up, in transit or delayed.
    pub active: usize,
    /// Approved but not yet shipped.
    pub pending: usize,
    /// Awaiting the supplier's answer.
    pub requests: usize,
}

impl ShipmentSummary {
    /// Count over `orders`.
    pub fn from_orders(orders: &[Order]) -> Self {
        orders.iter().fold(Self::default(), |mut acc, order| {
            match order.shipment_status {
                ShipmentStatus::Delivered => acc.completed += 1,
                ShipmentStatus::PickedUp | ShipmentStatus::InTransit | ShipmentStatus::Delayed => {
                    acc.active += 1
                }
                ShipmentStatus::Pending if order.request_status == RequestStatus::Approved => {
                    acc.pending += 1
                }
                ShipmentStatus::Pending => {}
            }
            if order.request_status == RequestStatus::Pending {
                acc.requests += 1;
            }
            acc
        })
    }
}

/// Orders awaiting the supplier's answer.
pub fn pending_order_requests(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| o.request_status == RequestStatus::Pending)
        .collect()
}

/// Orders a shipment can be started for.
pub fn eligible_for_shipment_start(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| {
            o.request_status == RequestStatus::Approved
                && o.shipment_status == ShipmentStatus::Pending
        })
        .collect()
}

/// Orders whose shipment can be completed.
pub fn eligible_for_shipment_completion(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| o.shipment_status.is_active())
        .collect()
}

/// Orders the prediction services run for.
pub(crate) fn awaiting_predictions(order: &Order) -> bool {
    matches!(
        order.shipment_status,
        ShipmentStatus::PickedUp | ShipmentStatus::InTransit
    )
}

/// Case-insensitive search over name, id and wallet address, optionally
/// restricted to one partner type.
pub fn filter_partners<'a>(
    partners: &'a [Partner],
    query: &str,
    partner_type: Option<PartnerType>,
) -> Vec<&'a Partner> {
    let needle = query.trim().to_lowercase();
    partners
        .iter()
        .filter(|p| partner_type.map_or(true, |t| p.partner_type == t))
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.id.to_lowercase().contains(&needle)
                || p.wallet_address.as_str().contains(&needle)
        })
        .collect()
}

/// Display severity of a delay probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DelaySeverity {
    /// `<= 0.4`.
    Low,
    /// `(0.4, 0.7]`.
    Medium,
    /// `> 0.7`.
    High,
}

impl DelaySeverity {
    /// Bucket a probability.
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.7 {
            DelaySeverity::High
        } else if probability > 0.4 {
            DelaySeverity::Medium
        } else {
            DelaySeverity::Low
        }
    }
}
