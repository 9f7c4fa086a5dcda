use anyhow::Result;
use async_trait::async_trait;

/// A trait defining the persistent store for the resume cursor.
/// This allows for different database implementations.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Retrieves the last delivered global sequence.
    /// Returns `None` if nothing has been stored yet.
    async fn get_last_global_sequence(&self) -> Result<Option<u64>>;

    /// Durably records the head of the last consumed batch.
    /// Must not return before the value survives a process crash.
    async fn set_last_global_sequence(&self, global_sequence: u64) -> Result<()>;
}
