use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    /// Creating the log directory or opening the log file failed.
    #[error("cannot open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid logger configuration: {message}")]
    Config { message: String },

    #[error("unknown log format: {message}")]
    Format { message: String },

    /// A global subscriber was installed earlier in this process.
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(String),
}

impl LoggerError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }
}
