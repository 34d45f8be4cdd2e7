use thiserror::Error;

/// Failure while locating, reading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    #[error("cannot parse configuration: {0}")]
    ParseError(String),

    /// `field` is the dotted settings path, e.g. `database.url`.
    #[error("invalid {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("bad environment variable: {0}")]
    EnvVarError(String),

    /// Two sources that cannot be combined were both given.
    #[error("conflicting configuration sources: {0}")]
    MutualExclusivityError(String),

    #[error(transparent)]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        ConfigError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }

    /// Settings path the error points at, if it concerns one field.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::ValidationError { field, .. } => Some(field),
            _ => None,
        }
    }
}
