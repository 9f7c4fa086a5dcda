//! # Streamer & Polling Worker
//!
//! This module defines the [`Streamer`], the entry point for following a Hyperion
//! node's action log.
//!
//! ## Core Components
//!
//! - [`Streamer`]: Holds the configuration and the page fetcher. Each call to
//!   [`Streamer::start`] spawns one independent polling worker.
//! - `PollWorker`: The single task that owns the cursor and backoff state. It
//!   builds a query, fetches a page, validates ordering, and either waits or
//!   hands the batch to the consumer.
//! - [`BatchStream`]: The consumer side of a running worker.
//!

mod poller;

use crate::{
    client::{HyperionClient, PageFetcher},
    config::ConnectorConfig,
    cursor::Cursor,
    error::StreamError,
    query::Filter,
    storage::Storage,
    stream::BatchStream,
};
use anyhow::Result;
use poller::PollWorker;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A shared context containing all dependencies required by a worker.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub config: Arc<ConnectorConfig>,
    pub fetcher: Arc<dyn PageFetcher>,
}

/// Follows the `get_actions` log of a Hyperion node.
///
/// The streamer itself is stateless between runs: the resume position is passed
/// to [`Streamer::start`] (or loaded from a [`Storage`] by [`Streamer::resume`])
/// and persisting progress is the consumer's job.
#[derive(Clone)]
pub struct Streamer {
    ctx: WorkerContext,
}

impl Streamer {
    /// Creates a streamer that talks to the configured Hyperion endpoint.
    pub fn new(config: Arc<ConnectorConfig>) -> Result<Self, StreamError> {
        let client = HyperionClient::new(&config.hyperion)?;
        Ok(Self::with_fetcher(config, Arc::new(client)))
    }

    /// Creates a streamer on top of a custom page fetcher.
    pub fn with_fetcher(config: Arc<ConnectorConfig>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            ctx: WorkerContext { config, fetcher },
        }
    }

    /// Spawns a polling worker that delivers every action after `from`.
    ///
    /// The worker stops when `shutdown` is cancelled, when the returned stream is
    /// dropped, or after yielding a fatal error.
    ///
    /// # Arguments
    ///
    /// * `from` - The last global sequence already consumed; `0` for a cold start.
    /// * `filters` - Query terms applied to every request.
    /// * `shutdown` - A parent token; the worker listens on a child of it.
    pub fn start(&self, from: u64, filters: Vec<Filter>, shutdown: &CancellationToken) -> BatchStream {
        let worker_token = shutdown.child_token();
        let (batch_tx, batch_rx) = mpsc::channel(self.ctx.config.channels.batch_buffer.max(1));

        let worker = PollWorker::new(
            self.ctx.clone(),
            Cursor::resume_from(from),
            filters,
            batch_tx,
            worker_token.clone(),
        );
        tokio::spawn(worker.run());

        BatchStream::new(batch_rx, worker_token)
    }

    /// Loads the resume cursor from `storage` and starts a worker from it.
    /// A missing cursor starts from the beginning of the log.
    pub async fn resume(
        &self,
        storage: &dyn Storage,
        filters: Vec<Filter>,
        shutdown: &CancellationToken,
    ) -> Result<BatchStream> {
        let from = storage.get_last_global_sequence().await?.unwrap_or(0);
        tracing::info!(global_sequence = from, "Booting streamer from stored cursor.");
        Ok(self.start(from, filters, shutdown))
    }
}
