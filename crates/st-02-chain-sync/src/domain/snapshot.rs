//! # View Snapshot
//!
//! The synchronizer's cache of ledger-derived collections. A snapshot is
//! published as one immutable value; patches build a new one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared_types::{CarbonEmission, Coordinates, DelayPrediction, Order, Partner};

use super::projections::{self, MapMarker, ShipmentSummary};

/// Everything the dashboard displays, as of one read batch plus any
/// confirmed patches since.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    /// Registered partners.
    pub partners: Vec<Partner>,
    /// All orders.
    pub orders: Vec<Order>,
    /// One row per order at most.
    pub emissions: Vec<CarbonEmission>,
    /// One row per order at most.
    pub predictions: Vec<DelayPrediction>,
    /// Connected account's location.
    pub user_location: Option<Coordinates>,
    /// Incremented on every full refresh.
    pub generation: u64,
    /// Time of the last full refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl ViewSnapshot {
    /// Look up an order.
    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Mutable order lookup for patches.
    pub fn order_mut(&mut self, id: &str) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    /// Look up a partner.
    pub fn partner(&self, id: &str) -> Option<&Partner> {
        self.partners.iter().find(|p| p.id == id)
    }

    /// Emission row for an order.
    pub fn emission_for(&self, order_id: &str) -> Option<&CarbonEmission> {
        self.emissions.iter().find(|e| e.order_id == order_id)
    }

    /// Prediction for an order.
    pub fn prediction_for(&self, order_id: &str) -> Option<&DelayPrediction> {
        self.predictions.iter().find(|p| p.order_id == order_id)
    }

    /// Replace the order's emission row, or append one.
    pub fn upsert_emission(&mut self, emission: CarbonEmission) {
        match self
            .emissions
            .iter_mut()
            .find(|e| e.order_id == emission.order_id)
        {
            Some(existing) => *existing = emission,
            None => self.emissions.push(emission),
        }
    }

    /// Replace the order's prediction, or append one.
    pub fn upsert_prediction(&mut self, prediction: DelayPrediction) {
        match self
            .predictions
            .iter_mut()
            .find(|p| p.order_id == prediction.order_id)
        {
            Some(existing) => *existing = prediction,
            None => self.predictions.push(prediction),
        }
    }

    /// Map markers for this snapshot.
    pub fn markers(&self) -> Vec<MapMarker> {
        projections::derive_markers(self.user_location.as_ref(), &self.partners, &self.orders)
    }

    /// Shipment counts for this snapshot.
    pub fn summary(&self) -> ShipmentSummary {
        ShipmentSummary::from_orders(&self.orders)
    }

    /// Sum of recorded emissions, kg.
    pub fn total_emissions(&self) -> f64 {
        self.emissions.iter().map(|e| e.emissions).sum()
    }
}
