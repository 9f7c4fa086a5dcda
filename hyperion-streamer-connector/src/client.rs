//! # Page Fetching
//!
//! [`PageFetcher`] is the seam between the polling worker and the network. The
//! production implementation, [`HyperionClient`], issues one `GET` per call
//! against a Hyperion node; tests substitute scripted fetchers.

use crate::{
    actions::{parse_page, ActionsPage},
    config::Hyperion,
    error::StreamError,
    query::ActionQuery,
};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, StatusCode};
use std::time::Duration;

/// The classified result of one request that did not fail fatally.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The node answered with a page of actions.
    Page(ActionsPage),
    /// The node answered `429 Too Many Requests`.
    RateLimited,
}

/// Fetches a single page of actions for a query.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, query: &ActionQuery) -> Result<FetchOutcome, StreamError>;
}

/// A `reqwest`-backed client for `GET /v2/history/get_actions`.
#[derive(Debug, Clone)]
pub struct HyperionClient {
    http_client: HttpClient,
    base_url: String,
}

impl HyperionClient {
    /// Creates a client from the Hyperion section of the connector configuration.
    pub fn new(config: &Hyperion) -> Result<Self, StreamError> {
        let mut builder = HttpClient::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http_client: builder.build()?,
            base_url: config.base_url().to_string(),
        })
    }

    /// Wraps an existing HTTP client.
    pub fn with_http_client(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PageFetcher for HyperionClient {
    async fn fetch(&self, query: &ActionQuery) -> Result<FetchOutcome, StreamError> {
        let url = query.url(&self.base_url);
        let response = self.http_client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(FetchOutcome::RateLimited);
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(StreamError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let page = parse_page(&body)?;
        tracing::debug!(
            actions = page.actions.len(),
            last_indexed_block = page.last_indexed_block,
            "Fetched actions page."
        );
        Ok(FetchOutcome::Page(page))
    }
}
