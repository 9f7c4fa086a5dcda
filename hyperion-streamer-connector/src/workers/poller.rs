use crate::{
    backoff::{sleep_with_cancellation, Backoff, Wait},
    client::FetchOutcome,
    cursor::{Batch, Cursor, Progress},
    error::StreamError,
    query::{ActionQuery, Filter},
    workers::WorkerContext,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Why the poll loop stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Cancelled,
    ConsumerGone,
}

pub(crate) struct PollWorker {
    ctx: WorkerContext,
    cursor: Cursor,
    backoff: Backoff,
    rate_limit_wait: Duration,
    page_limit: usize,
    filters: Vec<Filter>,
    batch_tx: mpsc::Sender<Result<Batch, StreamError>>,
    shutdown: CancellationToken,
}

impl PollWorker {
    pub fn new(
        ctx: WorkerContext,
        cursor: Cursor,
        filters: Vec<Filter>,
        batch_tx: mpsc::Sender<Result<Batch, StreamError>>,
        shutdown: CancellationToken,
    ) -> Self {
        let backoff = Backoff::new(ctx.config.backoff.sleep_base());
        let rate_limit_wait = ctx.config.backoff.rate_limit_wait();
        let page_limit = ctx.config.hyperion.page_limit;
        Self {
            ctx,
            cursor,
            backoff,
            rate_limit_wait,
            page_limit,
            filters,
            batch_tx,
            shutdown,
        }
    }

    /// Runs the loop to completion. The batch channel closes when this returns,
    /// after at most one error has been sent.
    pub async fn run(mut self) {
        tracing::info!(
            global_sequence = self.cursor.lower_bound(),
            "Poll worker started."
        );

        match self.poll().await {
            Ok(Stop::Cancelled) => {
                tracing::info!("PollWorker: shutdown signal received, exiting.");
            }
            Ok(Stop::ConsumerGone) => {
                tracing::warn!("PollWorker: batch receiver dropped, exiting.");
            }
            Err(e) => {
                tracing::error!(
                    global_sequence = self.cursor.lower_bound(),
                    "Poll worker stopped with an error: {}",
                    e
                );
                tokio::select! {
                    biased;
                    _ = self.shutdown.cancelled() => {}
                    _ = self.batch_tx.send(Err(e)) => {}
                }
            }
        }
    }

    async fn poll(&mut self) -> Result<Stop, StreamError> {
        loop {
            let query = ActionQuery::new(&self.cursor, self.page_limit, &self.filters);

            let outcome = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Ok(Stop::Cancelled),
                outcome = self.ctx.fetcher.fetch(&query) => outcome?,
            };

            let page = match outcome {
                FetchOutcome::Page(page) => page,
                FetchOutcome::RateLimited => {
                    let wait = self.rate_limit_wait;
                    tracing::info!(?wait, "rate limited");
                    if sleep_with_cancellation(wait, &self.shutdown).await == Wait::Cancelled {
                        return Ok(Stop::Cancelled);
                    }
                    continue;
                }
            };

            match self.cursor.evaluate(page)? {
                Progress::CaughtUp => {
                    let wait = self.backoff.caught_up();
                    tracing::info!(?wait, attempts = self.backoff.attempts(), "sleep");
                    if sleep_with_cancellation(wait, &self.shutdown).await == Wait::Cancelled {
                        return Ok(Stop::Cancelled);
                    }
                }
                Progress::Advanced(batch) => {
                    self.backoff.reset();
                    if let Some(stop) = self.emit(batch).await {
                        return Ok(stop);
                    }
                }
            }
        }
    }

    /// Hands a batch to the consumer, blocking until it is accepted.
    async fn emit(&self, batch: Batch) -> Option<Stop> {
        if self.shutdown.is_cancelled() {
            return Some(Stop::Cancelled);
        }

        tracing::debug!(
            head_global_sequence = batch.head_global_sequence,
            head_block = batch.head_block,
            actions = batch.actions.len(),
            "Emitting batch."
        );

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Some(Stop::Cancelled),
            sent = self.batch_tx.send(Ok(batch)) => match sent {
                Ok(()) => None,
                Err(_) => Some(Stop::ConsumerGone),
            },
        }
    }
}
