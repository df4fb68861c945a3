use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::diagnostics::Diagnostics;
use crate::error::ScraperError;

/// Retrieves raw markup for an absolute URL.
///
/// A single attempt per call: implementations must not retry. Any failure
/// aborts the crawl step that asked for the page.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, ScraperError>> + Send;
}

/// `reqwest`-backed [`PageFetcher`] with a per-request timeout.
///
/// Every fetch reports its outcome (URL plus status or cause) to the shared
/// [`Diagnostics`] sink.
pub struct HttpFetcher {
    client: Client,
    diagnostics: Arc<dyn Diagnostics>,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher` with the given request timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            diagnostics,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScraperError::Fetch {
                url: url.to_owned(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ScraperError::Fetch {
                url: url.to_owned(),
                source,
            })?;

        self.diagnostics
            .info(&format!("fetched {url} (status {})", status.as_u16()));
        Ok(body)
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        let result = self.get_text(url).await;
        if let Err(ref e) = result {
            self.diagnostics.error(&format!("failed to fetch {url}"), e);
        }
        result
    }
}
