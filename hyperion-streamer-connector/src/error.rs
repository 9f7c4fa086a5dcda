use thiserror::Error;

/// Fatal conditions that end a stream.
///
/// Rate limiting and cancellation are not represented here: the first is retried
/// by the worker and the second ends the stream without an error.
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("http request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("http error: status={status}")]
    HttpStatus { status: u16 },

    #[error("decode body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("get global_sequence: {0}")]
    InvalidGlobalSequence(String),

    #[error("got actions with global_sequence={head} out of order head={lower_bound}")]
    OrderingViolation { head: u64, lower_bound: u64 },
}
