//! The consumer side of the listener: prints batches and persists the cursor.

use crate::error::ListenerError;
use anyhow::{Context, Result};
use hyperion_streamer_connector::{Batch, BatchStream, Storage};
use std::io::Write;
use tokio_util::sync::CancellationToken;

/// Drains `stream` until it ends, fails, or `shutdown` fires.
///
/// Every action payload is written to `out` on its own line. The batch head is
/// stored only after the payloads were written, so a crash re-delivers at most
/// the last batch.
pub async fn consume<W: Write>(
    mut stream: BatchStream,
    storage: &dyn Storage,
    out: &mut W,
    progress_log_interval_blocks: u32,
    shutdown: &CancellationToken,
) -> Result<()> {
    let mut last_reported_block: u32 = 0;

    loop {
        let item = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            item = stream.next_batch() => item,
        };

        let batch = match item {
            None => return Ok(()),
            Some(Err(e)) => return Err(ListenerError::StreamStopped(e).into()),
            Some(Ok(batch)) => batch,
        };

        write_batch(out, &batch).context("write actions")?;
        storage
            .set_last_global_sequence(batch.head_global_sequence)
            .await
            .context("store state")?;

        if batch.head_block.saturating_sub(last_reported_block) > progress_log_interval_blocks {
            tracing::info!(block_num = batch.head_block, "current height");
            last_reported_block = batch.head_block;
        }
    }
}

fn write_batch<W: Write>(out: &mut W, batch: &Batch) -> std::io::Result<()> {
    for action in &batch.actions {
        writeln!(out, "{}", action.get())?;
    }
    out.flush()
}
