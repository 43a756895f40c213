//! HTTP prediction service adapters.
//!
//! `GET {base}/calculate-carbon/{orderId}` and
//! `GET {base}/predict-delay/{orderId}`. Any non-2xx answer or transport
//! failure is `ServiceUnavailable`; nothing is retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use shared_types::DelayPrediction;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::{CarbonEstimate, SyncError};
use crate::ports::{CarbonService, DelayService};

/// Shared GET-JSON helper.
struct JsonEndpoint {
    client: Client,
    base_url: String,
    service: &'static str,
}

impl JsonEndpoint {
    fn new(base_url: &str, timeout_secs: u64, service: &'static str) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| unavailable(service, None, e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            service,
        })
    }

    fn url(&self, path: &str, order_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, path, order_id)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, order_id: &str) -> Result<T, SyncError> {
        let url = self.url(path, order_id);
        debug!(url = %url, "[st-02] Calling {} service", self.service);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("[st-02] {} service unreachable: {}", self.service, e);
            unavailable(self.service, None, e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "[st-02] {} service failed", self.service);
            return Err(unavailable(
                self.service,
                Some(status.as_u16()),
                format!("HTTP {}", status.as_u16()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| unavailable(self.service, Some(status.as_u16()), e.to_string()))
    }
}

fn unavailable(service: &'static str, status: Option<u16>, message: String) -> SyncError {
    SyncError::ServiceUnavailable {
        service,
        status,
        message,
    }
}

/// Carbon calculator over HTTP.
pub struct HttpCarbonService {
    endpoint: JsonEndpoint,
}

impl HttpCarbonService {
    /// Create a client for the calculator at `base_url`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SyncError> {
        Ok(Self {
            endpoint: JsonEndpoint::new(base_url, timeout_secs, "carbon")?,
        })
    }

    /// Request URL for `order_id`.
    pub fn url_for(&self, order_id: &str) -> String {
        self.endpoint.url("calculate-carbon", order_id)
    }
}

#[async_trait]
impl CarbonService for HttpCarbonService {
    async fn calculate(&self, order_id: &str) -> Result<CarbonEstimate, SyncError> {
        self.endpoint.get("calculate-carbon", order_id).await
    }
}

/// Delay predictor over HTTP.
pub struct HttpDelayService {
    endpoint: JsonEndpoint,
}

impl HttpDelayService {
    /// Create a client for the predictor at `base_url`.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, SyncError> {
        Ok(Self {
            endpoint: JsonEndpoint::new(base_url, timeout_secs, "delay")?,
        })
    }

    /// Request URL for `order_id`.
    pub fn url_for(&self, order_id: &str) -> String {
        self.endpoint.url("predict-delay", order_id)
    }
}

#[async_trait]
impl DelayService for HttpDelayService {
    async fn predict(&self, order_id: &str) -> Result<DelayPrediction, SyncError> {
        self.endpoint.get("predict-delay", order_id).await
    }
}
