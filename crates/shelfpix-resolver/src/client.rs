//! One-shot page fetcher with a browser-like identity.

use std::time::Duration;

use reqwest::{redirect, Client, Url};

use crate::error::ResolverError;

/// Raw markup retrieved from a fetch target, paired with the final
/// post-redirect URL used as the base for resolving relative references.
///
/// Created per request and discarded after extraction; never cached.
#[derive(Debug, Clone)]
pub struct PageDocument {
    pub html: String,
    pub base_url: Url,
}

/// HTTP client for fetching raw page markup.
///
/// Impersonates a desktop browser (user-agent, accept, accept-language)
/// because many sites serve degraded or blocked markup to non-browser
/// clients. Each fetch is a single bounded attempt: fixed timeout, capped
/// redirect chain, no retries.
pub struct PageClient {
    client: Client,
}

impl PageClient {
    /// Creates a `PageClient` with the configured timeout, redirect cap, and
    /// user-agent.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        max_redirects: usize,
        user_agent: &str,
    ) -> Result<Self, ResolverError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .redirect(redirect::Policy::limited(max_redirects))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches the page at `url` and returns its markup together with the
    /// final request URL after redirects.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::UnexpectedStatus`] — any non-2xx status.
    /// - [`ResolverError::Http`] — network failure, timeout, or body read
    ///   failure.
    pub async fn fetch_page(&self, url: Url) -> Result<PageDocument, ResolverError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResolverError::UnexpectedStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        let base_url = response.url().clone();
        let html = response.text().await?;
        tracing::debug!(url = %base_url, bytes = html.len(), "fetched page markup");
        Ok(PageDocument { html, base_url })
    }
}
