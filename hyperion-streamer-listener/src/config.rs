use crate::error::ListenerError;
use anyhow::{Context, Result};
use hyperion_streamer_connector::config::ConnectorConfig;
use hyperion_streamer_logger::LogConfig;
use serde::Deserialize;

/// The smallest caught-up backoff base the listener accepts.
pub const MIN_SLEEP_BASE_MS: u64 = 1_000;

/// The top-level configuration for the Hyperion listener application.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct ListenerConfig {
    #[serde(default)]
    pub connector: ConnectorConfig,
    #[serde(default)]
    pub listener: ListenerSpecificConfig,
}

/// Contains settings that are unique to the listener binary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ListenerSpecificConfig {
    /// Where the resume cursor lives: a file, or a directory for `sled`.
    pub state_path: String,
    pub storage: StorageBackend,
    /// Url-encoded `get_actions` filters, e.g. `account=eosio&act.name=buyrambytes`.
    pub filter: String,
    /// Log the current head block once it moved by more than this many blocks.
    pub progress_log_interval_blocks: u32,
    /// Logging configuration.
    pub log: LogConfig,
}

/// Defines the backend used to persist the resume cursor.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    #[default]
    File,
    Sled,
}

impl Default for ListenerSpecificConfig {
    fn default() -> Self {
        Self {
            state_path: ".state".to_string(),
            storage: StorageBackend::File,
            filter: String::new(),
            progress_log_interval_blocks: 500,
            log: LogConfig::default(),
        }
    }
}

impl ListenerConfig {
    /// Rejects settings the listener refuses to run with.
    pub fn validate(&self) -> Result<(), ListenerError> {
        let sleep_base_ms = self.connector.backoff.sleep_base_ms;
        if sleep_base_ms < MIN_SLEEP_BASE_MS {
            return Err(ListenerError::SleepBaseTooSmall {
                got_ms: sleep_base_ms,
                min_ms: MIN_SLEEP_BASE_MS,
            });
        }
        Ok(())
    }
}

/// Loads the listener configuration from an optional TOML file, layered with
/// `HYPERION__`-prefixed environment variables.
///
/// It uses the `config` crate to read the sources and deserialize them into
/// the `ListenerConfig` struct. Environment keys are snake case and map onto
/// the kebab-case file keys, e.g. `HYPERION__CONNECTOR__BACKOFF__SLEEP_BASE_MS`
/// sets `connector.backoff.sleep-base-ms`.
pub fn load_config(path: Option<&str>) -> Result<ListenerConfig> {
    load_config_with_env(path, None)
}

/// Like [`load_config`], reading the variables from `env` instead of the
/// process environment when given.
fn load_config_with_env(
    path: Option<&str>,
    env: Option<config::Map<String, String>>,
) -> Result<ListenerConfig> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::with_name(path));
    }
    builder = builder.add_source(
        config::Environment::with_prefix("HYPERION")
            .separator("__")
            .convert_case(config::Case::Kebab)
            .source(env),
    );

    let settings: ListenerConfig = builder
        .build()
        .context(format!(
            "Failed to build configuration from '{}'",
            path.unwrap_or("<environment>")
        ))?
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    Ok(settings)
}
