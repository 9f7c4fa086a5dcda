//! A Rust library for following the action history of an Antelope chain through
//! a Hyperion node.
//!
//! The crate polls `GET /v2/history/get_actions` for actions matching a set of
//! filters and hands them out as ordered batches, each tagged with the highest
//! `global_sequence` it contains. Consumers persist that value and pass it back
//! on restart to resume where they left off.
//!
//! # Key Components
//!
//! *   [`workers::Streamer`]: The main entry point. It spawns the polling worker
//!     and returns a [`stream::BatchStream`].
//! *   [`client`]: The [`client::PageFetcher`] seam and its HTTP implementation.
//! *   [`cursor`]: The resume cursor and the ordering checks applied to each page.
//! *   [`storage`]: The trait for persisting the resume cursor.

/// Decoding of `get_actions` responses.
pub mod actions;
/// Caught-up backoff policy and cancellable waits.
pub mod backoff;
/// The `get_actions` HTTP client.
pub mod client;
/// Defines configuration structures for the connector.
pub mod config;
pub mod cursor;
pub mod error;
pub mod query;
/// A trait for persistent cursor state.
pub mod storage;
pub mod stream;
/// The background worker that drives the poll loop.
pub mod workers;

pub use client::{HyperionClient, PageFetcher};
pub use cursor::Batch;
pub use error::StreamError;
pub use query::Filter;
pub use storage::Storage;
pub use stream::BatchStream;
pub use workers::Streamer;
