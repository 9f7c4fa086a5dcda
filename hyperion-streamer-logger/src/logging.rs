use anyhow::{Context, Result};
use chrono::Local;
use serde::Deserialize;
use std::{fs::File, path::PathBuf, str::FromStr, sync::Arc};
use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{self, writer::MakeWriterExt},
    prelude::*,
    Registry,
};

/// Placeholder in `file-path` replaced with the local date, e.g. `streamer-{date}.log`.
pub const DATE_PLACEHOLDER: &str = "{date}";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Plain,
}

/// Where log records go. Stdout is usually reserved for action output, so the
/// default is stderr.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    Stdout,
    #[default]
    Stderr,
    File,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "kebab-case", default)]
pub struct LogConfig {
    /// Log level, e.g. "info", "debug", "trace".
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Path to the log file, required if output is "file".
    pub file_path: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Plain,
            output: LogOutput::Stderr,
            file_path: None,
        }
    }
}

impl LogConfig {
    /// The configured file path with [`DATE_PLACEHOLDER`] expanded.
    pub fn resolved_file_path(&self) -> Option<PathBuf> {
        self.file_path.as_deref().map(|path| {
            let date = Local::now().format("%Y-%m-%d").to_string();
            PathBuf::from(path.replace(DATE_PLACEHOLDER, &date))
        })
    }
}

pub fn init(config: &LogConfig) -> Result<()> {
    let log_level = Level::from_str(&config.level).unwrap_or(Level::INFO);
    let level_filter = LevelFilter::from_level(log_level);
    let subscriber = Registry::default().with(level_filter);

    match config.output {
        LogOutput::File => {
            let file_path = config.resolved_file_path().ok_or_else(|| {
                anyhow::anyhow!("Log output is 'file' but 'file_path' is not specified")
            })?;
            if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let log_file = File::create(&file_path)
                .with_context(|| format!("Failed to create log file {}", file_path.display()))?;
            let file_writer = Arc::new(log_file).with_max_level(log_level);

            match config.format {
                LogFormat::Json => {
                    subscriber.with(fmt::layer().with_writer(file_writer).json()).try_init()?
                }
                LogFormat::Plain => subscriber
                    .with(fmt::layer().with_writer(file_writer).with_ansi(false))
                    .try_init()?,
            }
        }
        LogOutput::Stdout => {
            let stdout_writer = std::io::stdout.with_max_level(log_level);
            match config.format {
                LogFormat::Json => {
                    subscriber.with(fmt::layer().with_writer(stdout_writer).json()).try_init()?
                }
                LogFormat::Plain => {
                    subscriber.with(fmt::layer().with_writer(stdout_writer).pretty()).try_init()?
                }
            }
        }
        LogOutput::Stderr => {
            let stderr_writer = std::io::stderr.with_max_level(log_level);
            match config.format {
                LogFormat::Json => {
                    subscriber.with(fmt::layer().with_writer(stderr_writer).json()).try_init()?
                }
                LogFormat::Plain => {
                    subscriber.with(fmt::layer().with_writer(stderr_writer).pretty()).try_init()?
                }
            }
        }
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_placeholder_is_expanded() {
        let config = LogConfig {
            file_path: Some("logs/streamer-{date}.log".to_string()),
            ..LogConfig::default()
        };

        let path = config.resolved_file_path().unwrap();
        let expected = format!("logs/streamer-{}.log", Local::now().format("%Y-%m-%d"));
        assert_eq!(path, PathBuf::from(expected));
    }

    #[test]
    fn file_output_requires_a_path() {
        let config = LogConfig {
            output: LogOutput::File,
            ..LogConfig::default()
        };

        let err = init(&config).unwrap_err();
        assert!(err.to_string().contains("file_path"));
    }

    #[test]
    fn file_output_creates_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("streamer.log");
        let config = LogConfig {
            output: LogOutput::File,
            format: LogFormat::Json,
            file_path: Some(path.to_string_lossy().into_owned()),
            ..LogConfig::default()
        };

        // Another test may already own the global subscriber; the file is
        // created before installation either way.
        let _ = init(&config);

        assert!(path.exists());
    }
}
