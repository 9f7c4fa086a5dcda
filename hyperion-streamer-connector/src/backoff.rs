use std::time::Duration;
use tokio::{task::yield_now, time::sleep};
use tokio_util::sync::CancellationToken;

/// Consecutive caught-up polls after which the wait stops growing.
pub const MAX_CAUGHT_UP_ATTEMPTS: u32 = 10;

/// Bases below this are treated as misconfigured.
pub const MIN_SLEEP_BASE: Duration = Duration::from_millis(10);

/// Base used in place of a misconfigured one.
pub const FALLBACK_SLEEP_BASE: Duration = Duration::from_secs(1);

/// Quadratic wait policy applied while the node has nothing new to return.
///
/// Each caught-up poll bumps `attempts` (saturating at
/// [`MAX_CAUGHT_UP_ATTEMPTS`]) and waits `attempts² × base`. Any page that moves
/// the cursor resets the counter.
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    base: Duration,
}

impl Backoff {
    pub fn new(base: Duration) -> Self {
        let base = if base < MIN_SLEEP_BASE {
            FALLBACK_SLEEP_BASE
        } else {
            base
        };
        Self { attempts: 0, base }
    }

    /// Records a caught-up poll and returns how long to wait before the next one.
    pub fn caught_up(&mut self) -> Duration {
        self.attempts = (self.attempts + 1).min(MAX_CAUGHT_UP_ATTEMPTS);
        self.base.saturating_mul(self.attempts * self.attempts)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn base(&self) -> Duration {
        self.base
    }
}

/// How a cancellable wait ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wait {
    Elapsed,
    Cancelled,
}

pub(crate) async fn sleep_with_cancellation(delay: Duration, token: &CancellationToken) -> Wait {
    if token.is_cancelled() {
        return Wait::Cancelled;
    }
    if delay.is_zero() {
        yield_now().await;
        return Wait::Elapsed;
    }

    tokio::select! {
        _ = token.cancelled() => Wait::Cancelled,
        _ = sleep(delay) => Wait::Elapsed,
    }
}
