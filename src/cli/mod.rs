//! Command-line interface: argument parsing, settings loading and dispatch.

mod executor;
mod handlers;
mod parser;
mod validation;

pub use executor::execute_command;
pub use parser::{Cli, Commands, Environment};

use crate::config::{ConfigError, ConfigLoader, Settings};
use crate::logger::{LoggerError, init_logger};

/// Load settings, applying `--config`, `--env` and the verbosity flags.
pub fn load_settings(cli: &Cli) -> Result<Settings, ConfigError> {
    let mut loader = ConfigLoader::new()?;
    if let Some(path) = &cli.config {
        loader = loader.with_config_file(path);
    }
    if let Some(env) = cli.env {
        loader = loader.with_environment(env.into());
    }

    let mut settings = loader.load()?;
    if let Some(level) = cli.log_level_override() {
        settings.logger.level = level.to_string();
    }
    Ok(settings)
}

pub fn init_logger_from_settings(settings: &Settings) -> Result<(), LoggerError> {
    let config = settings
        .logger
        .clone()
        .into_logger_config()
        .map_err(|e| LoggerError::config(e.to_string()))?;
    init_logger(config)
}
