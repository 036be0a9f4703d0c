//! Fetch transport
//!
//! The dispatcher fetches through the [`FetchTransport`] trait so tests can
//! substitute an instrumented transport. The production implementation is
//! a thin wrapper over a reqwest client configured with the crawler's
//! user-agent string and timeouts.

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Raw response body
    pub body: Vec<u8>,
}

impl FetchedPage {
    /// The body decoded as UTF-8, lossily
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Why a fetch failed
///
/// Every variant is retryable from the queue's point of view; the policy
/// decides how often.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Transport error for {url}: {message}")]
    Other { url: String, message: String },
}

/// Trait for fetching a single URL
#[async_trait]
pub trait FetchTransport: Send + Sync {
    /// Fetches `url`, resolving to the page on any 2xx response
    ///
    /// Non-2xx statuses, timeouts, and connection errors are all
    /// [`TransportError`]s; the dispatcher routes them into the retry
    /// machinery.
    async fn fetch(&self, url: &str) -> Result<FetchedPage, TransportError>;
}

/// Builds the shared HTTP client
///
/// User agent format: `CrawlerName/Version (+ContactURL; ContactEmail)`.
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed fetch transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with a freshly built client
    pub fn new(config: &UserAgentConfig, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config, timeout)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FetchTransport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, TransportError> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return Err(classify_error(url, e)),
        };

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        match response.bytes().await {
            Ok(body) => Ok(FetchedPage {
                url: final_url,
                status: status.as_u16(),
                body: body.to_vec(),
            }),
            Err(e) => Err(classify_error(url, e)),
        }
    }
}

/// Maps a reqwest error onto the transport taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        TransportError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        TransportError::Other {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> UserAgentConfig {
        UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }

    #[test]
    fn test_build_http_client() {
        let config = create_test_config();
        let client = build_http_client(&config, Duration::from_secs(30));
        assert!(client.is_ok());
    }

    #[test]
    fn test_body_text_lossy() {
        let page = FetchedPage {
            url: "https://example.com/".to_string(),
            status: 200,
            body: vec![0x68, 0x69, 0xff],
        };
        assert!(page.body_text().starts_with("hi"));
    }

    // HTTP behavior (status mapping, timeouts) is covered against a mock
    // server in tests/crawl_tests.rs
}
