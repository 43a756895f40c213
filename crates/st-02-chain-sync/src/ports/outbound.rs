//! # Outbound Ports
//!
//! Traits for external dependencies: the ledger contract and the two
//! prediction services.

use async_trait::async_trait;
use shared_types::{DelayPrediction, TxHash, WalletAddress};

use crate::domain::{
    CarbonEstimate, EmissionRecord, LedgerCall, OrderRecord, PartnerRecord, PredictionRecord,
    SyncError, TxReceipt,
};

/// Ledger collaborator - outbound port.
///
/// Collections are exposed the way the contract stores them: a count plus
/// indexed reads.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Number of partners.
    async fn partners_count(&self) -> Result<u64, SyncError>;

    /// Partner at `index`.
    async fn partner_at(&self, index: u64) -> Result<PartnerRecord, SyncError>;

    /// Number of orders.
    async fn orders_count(&self) -> Result<u64, SyncError>;

    /// Order at `index`.
    async fn order_at(&self, index: u64) -> Result<OrderRecord, SyncError>;

    /// Number of emission rows.
    async fn carbon_emissions_count(&self) -> Result<u64, SyncError>;

    /// Emission row at `index`.
    async fn carbon_emission_at(&self, index: u64) -> Result<EmissionRecord, SyncError>;

    /// Number of delay predictions.
    async fn delay_predictions_count(&self) -> Result<u64, SyncError>;

    /// Delay prediction at `index`.
    async fn delay_prediction_at(&self, index: u64) -> Result<PredictionRecord, SyncError>;

    /// Stored `(lat, lng)` of `user` in micro-degrees; `(0, 0)` if unset.
    async fn get_user_location(&self, user: &WalletAddress) -> Result<(i64, i64), SyncError>;

    /// Sign and send `call` from `from`. Returns once the transaction is
    /// accepted, not mined.
    async fn submit(&self, from: &WalletAddress, call: LedgerCall) -> Result<TxHash, SyncError>;

    /// Wait until `tx` has `confirmations` confirmations.
    async fn wait_for_confirmation(
        &self,
        tx: TxHash,
        confirmations: u64,
    ) -> Result<TxReceipt, SyncError>;
}

/// Carbon calculator - outbound port.
#[async_trait]
pub trait CarbonService: Send + Sync {
    /// Estimate emissions for `order_id`.
    async fn calculate(&self, order_id: &str) -> Result<CarbonEstimate, SyncError>;
}

/// Delay predictor - outbound port.
#[async_trait]
pub trait DelayService: Send + Sync {
    /// Predict the delay of `order_id`.
    async fn predict(&self, order_id: &str) -> Result<DelayPrediction, SyncError>;
}
