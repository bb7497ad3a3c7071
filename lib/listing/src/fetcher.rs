//! Page fetcher trait and HTTP implementation.

use crate::error::FetchError;
use crate::html::parse_listing;
use crate::record::ListingRecord;
use async_trait::async_trait;
use persona_chat_core::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Trait for listing page fetchers.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches a listing page and extracts its facts.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the page cannot be retrieved
    /// within the timeout, or no facts can be extracted.
    async fn fetch(&self, url: &str) -> Result<ListingRecord, FetchError>;
}

/// HTTP fetcher configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// User-Agent header sent to listing sites.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!("persona-chat/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

/// Fetches listing pages over HTTP(S) and extracts generic page metadata.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Creates a fetcher.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FetchError::ClientBuildFailed {
                reason: e.to_string(),
            })?;

        Ok(Self { client })
    }
}

fn validate_url(url: &str) -> std::result::Result<reqwest::Url, FetchError> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    #[instrument(skip(self))]
    async fn fetch(&self, url: &str) -> Result<ListingRecord, FetchError> {
        let target = validate_url(url)?;

        let response = self.client.get(target).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::RequestFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::RequestFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let record = parse_listing(&body, url);
        if record.is_empty() {
            return Err(FetchError::EmptyListing {
                url: url.to_string(),
            }
            .into());
        }

        debug!(
            features = record.features.len(),
            has_price = record.price.is_some(),
            "Listing extracted"
        );

        Ok(record)
    }
}
