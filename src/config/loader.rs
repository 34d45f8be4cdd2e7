//! Layered configuration loading
//!
//! Sources, lowest precedence first:
//! 1. `default.toml` (required)
//! 2. `{environment}.toml`
//! 3. `local.toml`
//! 4. `LOMBARTER_*` environment variables

use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};

use crate::config::environment::Environment as AppEnvironment;
use crate::config::error::ConfigError;
use crate::config::settings::Settings;

const CONFIG_DIR_ENV: &str = "LOMBARTER_CONFIG_DIR";
const CONFIG_FILE_ENV: &str = "LOMBARTER_CONFIG_FILE";
const DEFAULT_CONFIG_DIR: &str = "config";

const ENV_PREFIX: &str = "LOMBARTER";
/// `LOMBARTER_DATABASE__URL` maps to `database.url`
const ENV_SEPARATOR: &str = "__";

type Builder = ConfigBuilder<DefaultState>;

#[derive(Debug)]
pub struct ConfigLoader {
    config_dir: PathBuf,
    /// When set, layered loading is skipped and only this file is read.
    config_file: Option<PathBuf>,
    environment: AppEnvironment,
}

impl ConfigLoader {
    /// Create a loader from `LOMBARTER_CONFIG_DIR`, `LOMBARTER_CONFIG_FILE` and
    /// `LOMBARTER_APP_ENV`.
    ///
    /// # Errors
    ///
    /// Fails when both the directory and the file variables are set.
    pub fn new() -> Result<Self, ConfigError> {
        let dir = std::env::var(CONFIG_DIR_ENV).ok();
        let config_file = std::env::var(CONFIG_FILE_ENV).ok().map(PathBuf::from);

        if dir.is_some() && config_file.is_some() {
            return Err(ConfigError::mutual_exclusivity(format!(
                "{CONFIG_DIR_ENV} and {CONFIG_FILE_ENV} cannot both be set; \
                 use the directory for layered configuration or the file for a single source"
            )));
        }

        Ok(Self {
            config_dir: dir.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_DIR), PathBuf::from),
            config_file,
            environment: AppEnvironment::from_env(),
        })
    }

    /// Read a single file instead of the layered directory.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn with_environment(mut self, environment: AppEnvironment) -> Self {
        self.environment = environment;
        self
    }

    pub fn environment(&self) -> AppEnvironment {
        self.environment
    }

    /// The file or directory settings are read from, for diagnostics.
    pub fn source(&self) -> &Path {
        self.config_file.as_deref().unwrap_or(&self.config_dir)
    }

    /// Load, deserialize and validate settings from every source.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        let settings: Settings = self
            .build_config()?
            .try_deserialize()
            .map_err(|e| {
                ConfigError::ParseError(format!("Failed to deserialize configuration: {e}"))
            })?;

        settings.validate()?;
        Ok(settings)
    }

    fn build_config(&self) -> Result<Config, ConfigError> {
        let builder = match &self.config_file {
            Some(file) => Self::add_file_source(Config::builder(), file, true)?,
            None => self.build_layered_config(Config::builder())?,
        };

        Self::add_env_source(builder)
            .build()
            .map_err(ConfigError::from)
    }

    fn build_layered_config(&self, builder: Builder) -> Result<Builder, ConfigError> {
        let layers = [
            ("default.toml".to_string(), true),
            (format!("{}.toml", self.environment.as_str()), false),
            ("local.toml".to_string(), false),
        ];

        layers
            .into_iter()
            .try_fold(builder, |builder, (name, required)| {
                Self::add_file_source(builder, &self.config_dir.join(name), required)
            })
    }

    fn add_file_source(
        builder: Builder,
        path: &Path,
        required: bool,
    ) -> Result<Builder, ConfigError> {
        if required && !path.exists() {
            return Err(ConfigError::file_not_found(format!(
                "Required configuration file not found: {}",
                path.display()
            )));
        }

        let file = File::from(path).format(FileFormat::Toml).required(required);
        Ok(builder.add_source(file))
    }

    fn add_env_source(builder: Builder) -> Builder {
        builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator(ENV_SEPARATOR)
                .ignore_empty(true)
                .try_parsing(true),
        )
    }
}
