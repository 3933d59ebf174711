//! HTTP client for the transit API
//!
//! Performs the actual network calls behind the cache's fetch functions. Every
//! response is decoded into an opaque `serde_json::Value`; shaping it into typed
//! rows is left to the data layer.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::{Endpoint, GO_API_BASE_URL, TTC_API_BASE_URL};

/// Default network timeout for a single request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when fetching from the transit API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, DNS, TLS, ...)
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// The server answered with a non-2xx status
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The response body was not valid JSON
    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    fn from_reqwest(error: reqwest::Error, url: &str) -> Self {
        if error.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
            }
        } else {
            ApiError::Request(error)
        }
    }
}

/// Client for the GO Transit / TTC endpoints
#[derive(Debug, Clone)]
pub struct TransitClient {
    http_client: Client,
    go_base_url: String,
    ttc_base_url: String,
}

impl TransitClient {
    /// Creates a client against the public endpoints with the default timeout
    pub fn new() -> Result<Self, ApiError> {
        Self::with_config(GO_API_BASE_URL, TTC_API_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Creates a client with custom base URLs and timeout
    pub fn with_config(
        go_base_url: impl Into<String>,
        ttc_base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            http_client,
            go_base_url: go_base_url.into(),
            ttc_base_url: ttc_base_url.into(),
        })
    }

    /// Returns the full URL for an endpoint
    pub fn url_for(&self, endpoint: Endpoint) -> String {
        endpoint.url(&self.go_base_url, &self.ttc_base_url)
    }

    /// Fetches an endpoint and decodes the body as JSON
    ///
    /// # Returns
    /// * `Ok(Value)` - The decoded response body
    /// * `Err(ApiError)` - On transport failure, timeout, non-2xx status or a body
    ///   that is not JSON
    pub async fn fetch_json(&self, endpoint: Endpoint) -> Result<Value, ApiError> {
        let url = self.url_for(endpoint);
        debug!(event = "api.request_started", endpoint = %endpoint, url = %url);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(e, &url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(e, &url))?;
        let value: Value = serde_json::from_str(&text)?;

        debug!(event = "api.request_completed", endpoint = %endpoint, bytes = text.len());
        Ok(value)
    }
}
