use async_trait::async_trait;
use failsafe::futures::CircuitBreaker;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

use crate::circuit_breaker::{create_lookup_circuit_breaker, LookupCircuitBreaker};
use crate::errors::AppError;

/// Answers whether the lender operates in a postal code.
#[async_trait]
pub trait PincodeLookup: Send + Sync {
    async fn check_pincode(&self, pincode: &str) -> Result<bool, AppError>;
}

#[derive(Debug, Deserialize)]
struct PincodeStatus {
    serviceable: bool,
}

/// Client for the pincode serviceability service.
///
/// `GET {base_url}/pincodes/{pincode}` answers `{"serviceable": bool}`;
/// a 404 means the pincode is outside the footprint.
#[derive(Clone)]
pub struct PincodeServiceClient {
    client: reqwest::Client,
    base_url: String,
    breaker: LookupCircuitBreaker,
}

impl PincodeServiceClient {
    /// Creates a new `PincodeServiceClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the pincode service, without trailing slash.
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create pincode client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            breaker: create_lookup_circuit_breaker(),
        })
    }

    async fn fetch(&self, pincode: &str) -> Result<bool, AppError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| AppError::ExternalApiError(format!("Invalid pincode service URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                AppError::ExternalApiError("Pincode service URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(["pincodes", pincode]);

        tracing::debug!("Checking pincode serviceability: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::ExternalApiError(format!("Pincode service request failed: {}", e))
        })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Pincode service returned error {}: {}", status, error_text);
            return Err(AppError::ExternalApiError(format!(
                "Pincode service returned status {}: {}",
                status, error_text
            )));
        }

        let status: PincodeStatus = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse pincode service response: {}", e))
        })?;

        Ok(status.serviceable)
    }
}

#[async_trait]
impl PincodeLookup for PincodeServiceClient {
    async fn check_pincode(&self, pincode: &str) -> Result<bool, AppError> {
        let pincode = pincode.trim();
        match self.breaker.call(self.fetch(pincode)).await {
            Ok(serviceable) => {
                tracing::info!("Pincode {} serviceable: {}", pincode, serviceable);
                Ok(serviceable)
            }
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("Pincode service circuit open, rejecting lookup for {}", pincode);
                Err(AppError::ExternalApiError(
                    "Pincode service unavailable (circuit open)".to_string(),
                ))
            }
        }
    }
}
