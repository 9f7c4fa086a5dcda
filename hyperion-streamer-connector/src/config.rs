use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Page size used when the configured limit is zero.
pub const DEFAULT_PAGE_LIMIT: usize = 100;

/// The top-level configuration for the `hyperion-streamer-connector` library.
///
/// This struct aggregates the Hyperion endpoint settings and the polling
/// behaviour of the streamer. It is typically deserialized from a configuration
/// file and handed to [`crate::workers::Streamer`] on construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectorConfig {
    #[serde(default)]
    pub hyperion: Hyperion,
    #[serde(default)]
    pub backoff: Backoff,
    #[serde(default)]
    pub channels: ChannelConfig,
}

/// Defines the connection settings for the Hyperion history API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Hyperion {
    /// Base URL of the Hyperion node, without the `/v2/...` path.
    pub endpoint: String,
    /// Number of actions requested per page. `0` falls back to [`DEFAULT_PAGE_LIMIT`].
    pub page_limit: usize,
    /// Optional per-request timeout applied by the HTTP client.
    pub request_timeout_secs: Option<u64>,
}

/// Defines the wait policy of the polling worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Backoff {
    /// Base unit of the caught-up backoff, in milliseconds. The n-th consecutive
    /// empty poll waits `n² × base`.
    pub sleep_base_ms: u64,
    /// Fixed wait after the node answers `429 Too Many Requests`, in milliseconds.
    pub rate_limit_wait_ms: u64,
}

/// Defines capacities for the MPSC channels within the connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChannelConfig {
    /// The buffer capacity for the batch channel between the worker and the consumer.
    pub batch_buffer: usize,
}

impl Hyperion {
    /// The endpoint with any trailing slashes removed.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

impl Backoff {
    pub fn sleep_base(&self) -> Duration {
        Duration::from_millis(self.sleep_base_ms)
    }

    pub fn rate_limit_wait(&self) -> Duration {
        Duration::from_millis(self.rate_limit_wait_ms)
    }
}

impl Default for Hyperion {
    fn default() -> Self {
        Self {
            endpoint: "https://wax.greymass.com".to_string(),
            page_limit: 1000,
            request_timeout_secs: None,
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            sleep_base_ms: 30_000,
            rate_limit_wait_ms: 20_000,
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { batch_buffer: 1 }
    }
}
