//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with bounded total and connect timeouts
//! - Retry logic for transient failures
//! - Error classification

use crate::config::{Config, FetchConfig, UserAgentConfig};
use crate::crawler::parser::{parse_page, PageRules, ParsedPage};
use reqwest::header::{HeaderMap, CONTENT_LENGTH, DATE, LAST_MODIFIED};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;

/// Maximum number of redirects followed for one request
const MAX_REDIRECTS: usize = 10;

/// Why a page could not be fetched
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }

    /// Whether another attempt could succeed
    ///
    /// | Condition | Retry |
    /// |-----------|-------|
    /// | Timeout | yes |
    /// | Connection / transport error | yes |
    /// | HTTP 429, 5xx | yes |
    /// | Any other status | no |
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Raw response of a successful fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The requested URL
    pub url: String,
    pub status: u16,
    /// `Content-Length` of an uncompressed response
    pub content_length: Option<u64>,
    pub last_modified: Option<String>,
    pub date_header: Option<String>,
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use sumi_index::config::{FetchConfig, UserAgentConfig};
/// use sumi_index::crawler::build_http_client;
///
/// let agent = UserAgentConfig {
///     crawler_name: "SumiIndex".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&agent, &FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(
    agent: &UserAgentConfig,
    fetch: &FetchConfig,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        agent.crawler_name, agent.crawler_version, agent.contact_url, agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(fetch.timeout_ms))
        .connect_timeout(Duration::from_millis(fetch.connect_timeout_ms))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

fn header_text(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Fetches a URL once
///
/// Any non-success status is a failure; the body is not read in that case.
pub async fn fetch_url(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let headers = response.headers();
    // absent for gzip or brotli bodies, which reqwest strips while decoding
    let content_length = header_text(headers, CONTENT_LENGTH).and_then(|v| v.trim().parse().ok());
    let last_modified = header_text(headers, LAST_MODIFIED);
    let date_header = header_text(headers, DATE);

    let body = response
        .text()
        .await
        .map_err(|e| FetchError::from_reqwest(url, e))?;

    Ok(FetchedPage {
        url: url.to_string(),
        status: status.as_u16(),
        content_length,
        last_modified,
        date_header,
        body,
    })
}

/// Fetches a URL, retrying transient failures
///
/// Makes at most `retries + 1` attempts with a fixed delay between them.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    config: &FetchConfig,
) -> Result<FetchedPage, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_url(client, url).await {
            Ok(page) => return Ok(page),
            Err(e) if e.is_retryable() && attempt < config.retries => {
                attempt += 1;
                tracing::debug!(
                    "Retrying {} ({}/{}) after: {}",
                    url,
                    attempt,
                    config.retries,
                    e
                );
                tokio::time::sleep(Duration::from_millis(config.retry_delay_ms)).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fetches and parses pages under one site's rules
pub struct PageFetcher {
    client: Client,
    fetch: FetchConfig,
    rules: PageRules,
}

impl PageFetcher {
    pub fn new(config: &Config) -> crate::Result<Self> {
        let client = build_http_client(&config.user_agent, &config.fetch)?;
        let rules = PageRules::from_config(&config.crawler)?;
        Ok(Self {
            client,
            fetch: config.fetch.clone(),
            rules,
        })
    }

    /// Fetches one page and extracts everything the index stores
    pub async fn fetch_page(&self, url: &str) -> Result<ParsedPage, FetchError> {
        let raw = fetch_with_retry(&self.client, url, &self.fetch).await?;
        Ok(parse_page(&raw, &self.rules))
    }

    /// Fetches one page and returns only its outbound links
    pub async fn fetch_links(&self, url: &str) -> Result<Vec<String>, FetchError> {
        Ok(self.fetch_page(url).await?.links)
    }
}
