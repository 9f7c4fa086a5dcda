use crate::config::{ListenerConfig, StorageBackend};
use clap::{Parser, Subcommand};

/// The main CLI structure for the Hyperion listener.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Defines the available subcommands for the application.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the action history and print every matching action to stdout.
    Run(RunCmd),
}

/// Arguments for the `run` subcommand.
///
/// Flags override the values loaded from the configuration file.
#[derive(Parser, Debug, Default)]
pub struct RunCmd {
    /// Path to the listener configuration TOML file.
    /// If not provided, default values will be used.
    #[arg(short, long)]
    pub config: Option<String>,

    /// Hyperion endpoint, e.g. https://wax.greymass.com
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Where the resume cursor is kept.
    #[arg(long)]
    pub state_file: Option<String>,

    /// Backend used for the resume cursor.
    #[arg(long, value_enum)]
    pub storage: Option<StorageBackend>,

    /// Base sleep time of the caught-up backoff, in milliseconds.
    #[arg(long)]
    pub sleep_time_base_ms: Option<u64>,

    /// Url-encoded filters passed to get_actions, e.g. 'account=eosio&act.name=buyrambytes'
    #[arg(long)]
    pub filter: Option<String>,
}

impl RunCmd {
    /// Writes every flag that was given over the loaded configuration.
    pub fn apply(&self, config: &mut ListenerConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.connector.hyperion.endpoint = endpoint.clone();
        }
        if let Some(state_file) = &self.state_file {
            config.listener.state_path = state_file.clone();
        }
        if let Some(storage) = self.storage {
            config.listener.storage = storage;
        }
        if let Some(sleep_base_ms) = self.sleep_time_base_ms {
            config.connector.backoff.sleep_base_ms = sleep_base_ms;
        }
        if let Some(filter) = &self.filter {
            config.listener.filter = filter.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_configuration() {
        let cli = Cli::try_parse_from([
            "hyperion-streamer",
            "run",
            "--endpoint",
            "https://eos.example.io",
            "--state-file",
            "/tmp/cursor",
            "--storage",
            "sled",
            "--sleep-time-base-ms",
            "2000",
            "--filter",
            "account=eosio",
        ])
        .unwrap();
        let Commands::Run(run_cmd) = cli.command;
        let mut config = ListenerConfig::default();

        run_cmd.apply(&mut config);

        assert_eq!(config.connector.hyperion.endpoint, "https://eos.example.io");
        assert_eq!(config.listener.state_path, "/tmp/cursor");
        assert_eq!(config.listener.storage, StorageBackend::Sled);
        assert_eq!(config.connector.backoff.sleep_base_ms, 2000);
        assert_eq!(config.listener.filter, "account=eosio");
    }

    #[test]
    fn absent_flags_keep_configuration() {
        let mut config = ListenerConfig::default();
        config.listener.filter = "account=eosio".to_string();

        RunCmd::default().apply(&mut config);

        assert_eq!(config.listener.filter, "account=eosio");
        assert_eq!(config.listener.state_path, ".state");
    }
}
