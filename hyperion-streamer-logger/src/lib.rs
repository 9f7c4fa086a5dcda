//! Process-wide `tracing` setup shared by the streamer binaries.

pub mod logging;

pub use logging::{init, LogConfig, LogFormat, LogOutput};
