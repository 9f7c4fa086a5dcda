use hyperion_streamer_connector::StreamError;
use thiserror::Error;

/// Defines the errors raised by the listener itself.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("{0:?} contains multiple values, only one is allowed")]
    DuplicateFilterKey(String),

    #[error("at least one filter is required")]
    NoFilters,

    #[error("sleep-time-base must be at least {min_ms}ms, got {got_ms}ms")]
    SleepBaseTooSmall { got_ms: u64, min_ms: u64 },

    #[error("loader stopped: {0}")]
    StreamStopped(#[from] StreamError),
}
