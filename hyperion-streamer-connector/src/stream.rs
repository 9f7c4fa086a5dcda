//! # Batch Stream
//!
//! The consumer side of a running streamer. A [`BatchStream`] yields batches in
//! strictly increasing `head_global_sequence` order. If the worker hits a fatal
//! condition it yields exactly one `Err` as its last item; on cancellation it
//! simply ends.

use crate::{cursor::Batch, error::StreamError};
use futures::Stream;
use std::{
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::ReceiverStream, StreamExt};
use tokio_util::sync::CancellationToken;

/// A pull-based stream of `Result<Batch, StreamError>` produced by a single
/// background worker.
///
/// Dropping the stream cancels the worker.
#[derive(Debug)]
pub struct BatchStream {
    inner: ReceiverStream<Result<Batch, StreamError>>,
    /// Cancels the worker that feeds this stream.
    worker_token: CancellationToken,
}

impl BatchStream {
    pub(crate) fn new(
        batch_rx: mpsc::Receiver<Result<Batch, StreamError>>,
        worker_token: CancellationToken,
    ) -> Self {
        Self {
            inner: ReceiverStream::new(batch_rx),
            worker_token,
        }
    }

    /// Receives the next batch. Returns `None` once the worker has stopped.
    pub async fn next_batch(&mut self) -> Option<Result<Batch, StreamError>> {
        self.inner.next().await
    }

    /// Asks the worker to stop. Batches already handed over remain readable.
    pub fn cancel(&self) {
        self.worker_token.cancel();
    }
}

impl Stream for BatchStream {
    type Item = Result<Batch, StreamError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl Drop for BatchStream {
    fn drop(&mut self) {
        if !self.worker_token.is_cancelled() {
            tracing::debug!("BatchStream dropped, stopping its worker.");
            self.worker_token.cancel();
        }
    }
}
