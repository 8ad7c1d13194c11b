//! HTTP client for the Veeqo order-management REST API.
//!
//! Wraps `reqwest` with API-key header auth. The orders payload is treated as
//! opaque JSON and relayed to callers verbatim; no schema is imposed here.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::VeeqoError;

const DEFAULT_BASE_URL: &str = "https://api.veeqo.com/";

/// Fixed page size for the orders pass-through.
const ORDERS_PAGE_SIZE: u32 = 250;

/// Client for the Veeqo REST API.
///
/// Manages the HTTP client, API key, and base URL. Use [`VeeqoClient::new`]
/// for production or [`VeeqoClient::with_base_url`] to point at a mock server
/// in tests.
pub struct VeeqoClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl VeeqoClient {
    /// Creates a new client pointed at the production Veeqo API.
    ///
    /// # Errors
    ///
    /// Returns [`VeeqoError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, VeeqoError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`VeeqoError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`VeeqoError::InvalidBaseUrl`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, VeeqoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shelfpix/0.1 (order-dashboard)")
            .build()?;

        // Normalise: ensure the base URL ends with exactly one slash so that
        // joined paths land under the root rather than replacing the last
        // path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| VeeqoError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Fetches one fixed-shape page of orders (`per_page=250`) and returns
    /// the body as opaque JSON.
    ///
    /// # Errors
    ///
    /// - [`VeeqoError::UnexpectedStatus`] — any non-2xx status, including
    ///   auth rejections.
    /// - [`VeeqoError::Http`] — network failure, timeout, or a body that is
    ///   not valid JSON.
    pub async fn list_orders(&self) -> Result<serde_json::Value, VeeqoError> {
        let url = self.orders_url();
        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VeeqoError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.json::<serde_json::Value>().await?)
    }

    fn orders_url(&self) -> Url {
        let mut url = self
            .base_url
            .join("orders")
            .unwrap_or_else(|_| self.base_url.clone());
        url.query_pairs_mut()
            .append_pair("per_page", &ORDERS_PAGE_SIZE.to_string());
        url
    }
}
