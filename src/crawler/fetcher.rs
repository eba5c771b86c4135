//! HTTP fetcher implementation
//!
//! This module handles the HTTP side of the crawler: building the client and
//! fetching a single listing page. Success is strictly HTTP 200 with a text
//! body; anything else is an error the crawl loop must surface to its caller.
//! Retry policy, if any, belongs to whoever wraps the loop, not here.

use crate::config::CrawlerConfig;
use crate::CrawlError;
use reqwest::Client;
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (user agent, timeouts)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one listing page and returns the response body
///
/// # Contract
///
/// * HTTP 200 → the body text.
/// * Any other status → `CrawlError::Fetch { url, status }`. A non-200 page is
///   never treated as "no more results"; that decision belongs to the page
///   parser's emptiness rule.
/// * Transport failures (timeout, connection refused, TLS) →
///   `CrawlError::Http { url, source }`.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, CrawlError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if status.as_u16() != 200 {
        return Err(CrawlError::Fetch {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| CrawlError::Http {
        url: url.to_string(),
        source,
    })
}
