//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for report pages
//! - Turning transport failures and non-2xx responses into errors
//! - Parsing response bodies into HTML documents
//!
//! There is no retry logic. A failed request aborts the crawl.

use crate::config::CrawlerConfig;
use crate::ScrapeError;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use asn_harvest::config::CrawlerConfig;
/// use asn_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches report pages and parses them into documents
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher for the given crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, ScrapeError> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL and returns the response body
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Body of a 2xx response
    /// * `Err(ScrapeError::Http)` - DNS failure, refused connection, timeout
    /// * `Err(ScrapeError::Status)` - Any non-2xx status
    pub async fn fetch_text(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| ScrapeError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| ScrapeError::Http {
            url: url.to_string(),
            source,
        })
    }

    /// Fetches a URL and parses the body as an HTML document
    ///
    /// Every call issues a new request; nothing is cached.
    pub async fn fetch_document(&self, url: &str) -> Result<Html, ScrapeError> {
        let body = self.fetch_text(url).await?;
        tracing::trace!("Fetched {} bytes from {}", body.len(), url);
        Ok(Html::parse_document(&body))
    }
}
