//! Provides concrete implementations of the `Storage` trait defined in the
//! `hyperion-streamer-connector` library: a single state file and a `sled` database.
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs, io::AsyncWriteExt};

use crate::config::{ListenerSpecificConfig, StorageBackend};
use hyperion_streamer_connector::Storage;

const LAST_GLOBAL_SEQUENCE_KEY: &str = "sync::last_global_sequence";

/// The persisted resume state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub head_global_sequence: u64,
}

/// Opens the storage backend selected in the configuration.
pub fn open_storage(config: &ListenerSpecificConfig) -> Result<Arc<dyn Storage>> {
    match config.storage {
        StorageBackend::File => Ok(Arc::new(FileStorage::new(&config.state_path))),
        StorageBackend::Sled => {
            let db = sled::open(&config.state_path)
                .with_context(|| format!("Failed to open sled database at '{}'", config.state_path))?;
            Ok(Arc::new(SledStorage::new(db)))
        }
    }
}

/// Keeps the [`SyncState`] in a single bincode-encoded file.
///
/// Writes go to a sibling temporary file that is synced and then renamed over
/// the state file, so a crash leaves either the old or the new state.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    pub async fn load(&self) -> Result<Option<SyncState>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        let (state, _) = bincode::serde::decode_from_slice::<SyncState, _>(
            &raw,
            bincode::config::standard(),
        )
        .context("decode")?;
        Ok(Some(state))
    }

    pub async fn store(&self, state: SyncState) -> Result<()> {
        let encoded = bincode::serde::encode_to_vec(state, bincode::config::standard())
            .context("encode")?;

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)
            .await
            .with_context(|| format!("write {}", temp_path.display()))?;
        file.write_all(&encoded).await.context("write")?;
        file.sync_all().await.context("sync")?;
        drop(file);

        fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("replace {}", self.path.display()))?;
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn get_last_global_sequence(&self) -> Result<Option<u64>> {
        Ok(self.load().await?.map(|state| state.head_global_sequence))
    }

    async fn set_last_global_sequence(&self, global_sequence: u64) -> Result<()> {
        self.store(SyncState {
            head_global_sequence: global_sequence,
        })
        .await
    }
}

/// A `sled`-backed implementation of the `Storage` trait.
#[derive(Clone)]
pub struct SledStorage {
    db: Db,
}

impl SledStorage {
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Storage for SledStorage {
    /// Returns `None` if no cursor has been stored yet.
    async fn get_last_global_sequence(&self) -> Result<Option<u64>> {
        let Some(raw) = self.db.get(LAST_GLOBAL_SEQUENCE_KEY)? else {
            return Ok(None);
        };
        let text = std::str::from_utf8(&raw).context("stored cursor is not utf-8")?;
        let value = text
            .parse::<u64>()
            .with_context(|| format!("stored cursor {text:?} is not a number"))?;
        Ok(Some(value))
    }

    /// Stores the cursor and flushes it to disk before returning.
    async fn set_last_global_sequence(&self, global_sequence: u64) -> Result<()> {
        self.db.insert(
            LAST_GLOBAL_SEQUENCE_KEY,
            global_sequence.to_string().as_bytes(),
        )?;
        self.db.flush_async().await?;
        Ok(())
    }
}
