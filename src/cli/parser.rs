//! CLI argument parsing with clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// User and order persistence service
#[derive(Parser, Debug)]
#[command(name = "lombarter")]
#[command(about = "User and order persistence service")]
#[command(long_about = "
Lombarter stores users and orders in MongoDB or in memory, keeps a user
cache in front of the datastore and publishes a notification for every
user update.

EXAMPLES:
    # Run with config/default.toml and friends
    lombarter

    # Run against a single configuration file
    lombarter --config /etc/lombarter/production.toml run

    # Staging layers with debug logging
    lombarter --env staging --verbose run

    # Validate configuration and exit
    lombarter check
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Reads only this TOML file instead of the layered `config/` directory.
    /// `LOMBARTER_*` environment variables still apply on top.
    #[arg(
        short,
        long,
        value_name = "FILE",
        value_parser = super::validation::validate_config_file_path
    )]
    pub config: Option<PathBuf>,

    /// Override environment detection (`LOMBARTER_APP_ENV`)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    /// Log errors only
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Connect the datastore and serve until interrupted (default)
    Run,
    /// Validate configuration and datastore selection, then exit
    ///
    /// Nothing is connected. Exit code is non-zero when the configuration is invalid.
    Check,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

impl Cli {
    pub fn selected_command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }

    /// Level forced by `--verbose` or `--quiet`, if any.
    pub fn log_level_override(&self) -> Option<&'static str> {
        match (self.verbose, self.quiet) {
            (true, _) => Some("debug"),
            (_, true) => Some("error"),
            _ => None,
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}
