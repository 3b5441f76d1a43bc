//! Static HTTP fetch layer shared by the non-rendered extractors.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScrapeError;

/// HTTP client for single-shot product-page fetches.
///
/// One instance is shared across every static extractor; it carries the
/// desktop-browser user agent and the fixed request timeout so a stuck
/// site cannot stall a refresh batch.
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// Creates a `FetchClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches the HTML body of a product page.
    ///
    /// # Errors
    ///
    /// - [`ScrapeError::HttpStatus`] — any non-2xx response.
    /// - [`ScrapeError::Http`] — network or TLS failure, including timeout.
    pub async fn get_html(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "fa-IR,fa;q=0.9,en;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
