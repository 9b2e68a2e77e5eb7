//! REST client for the imagery backend and the data-product probe.
//!
//! ERROR HANDLING
//! ==============
//! Transport and HTTP failures are returned as [`ApiError`]. When wrapped
//! in [`DataProductProbe`], every failure becomes a probe rejection and is
//! retried by the poller; permanent-looking failures (4xx, failed jobs) are
//! still retried but logged at `warn` so they are not silently masked.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use super::types::{DataProduct, DataProductRef, JobStatus};
use crate::config::ApiConfig;
use crate::poll::{Probe, ProbeError};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The backend returned a non-success status.
    #[error("API response error: status {status}")]
    Response { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Whether retrying the same request is unlikely to ever succeed.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::Response { status, .. } => (400..500).contains(status) && !matches!(status, 408 | 429),
            Self::Parse(_) | Self::HttpClientBuild(_) => true,
            Self::Request(_) => false,
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: config.base_url.clone(), token: None })
    }

    /// Attach a bearer token to every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Fetch one data product.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-200 status, or an
    /// unparseable body.
    pub async fn data_product(&self, product: DataProductRef) -> Result<DataProduct, ApiError> {
        let url = format!(
            "{}{}",
            self.base_url,
            data_product_endpoint(product.project_id, product.flight_id, product.data_product_id)
        );

        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        if status != 200 {
            return Err(ApiError::Response { status, body: text });
        }

        parse_data_product(&text)
    }
}

fn data_product_endpoint(project_id: Uuid, flight_id: Uuid, data_product_id: Uuid) -> String {
    format!("/api/v1/projects/{project_id}/flights/{flight_id}/data_products/{data_product_id}")
}

fn parse_data_product(json: &str) -> Result<DataProduct, ApiError> {
    serde_json::from_str(json).map_err(|e| ApiError::Parse(e.to_string()))
}

// =============================================================================
// PROBE
// =============================================================================

/// Resolves once the data product's processing job reports `SUCCESS`.
pub struct DataProductProbe {
    client: Arc<ApiClient>,
    product: DataProductRef,
}

impl DataProductProbe {
    #[must_use]
    pub fn new(client: Arc<ApiClient>, product: DataProductRef) -> Self {
        Self { client, product }
    }
}

#[async_trait::async_trait]
impl Probe for DataProductProbe {
    type Output = DataProduct;

    async fn probe(&self) -> Result<DataProduct, ProbeError> {
        let product = match self.client.data_product(self.product).await {
            Ok(product) => product,
            Err(e) => {
                if e.is_permanent() {
                    warn!(data_product_id = %self.product.data_product_id, error = %e, "data product check failed; will retry");
                }
                return Err(e.into());
            }
        };

        match product.status {
            JobStatus::Success => Ok(product),
            JobStatus::Failed => {
                warn!(data_product_id = %product.id, "data product job failed; will retry");
                Err(ProbeError::JobFailed { id: product.id.to_string(), status: product.status })
            }
            status => {
                debug!(data_product_id = %product.id, %status, "data product not ready");
                Err(ProbeError::NotReady(format!("data product {} is {status}", product.id)))
            }
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
