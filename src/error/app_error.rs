use thiserror::Error;
use validator::ValidationErrors;

use crate::cache::CacheError;
use crate::config::error::ConfigError;
use crate::db::DataStoreError;
use crate::forms::PaginationError;

/// Application-wide error type that represents all possible errors in the system.
///
/// Repository and service calls wrap the errors they propagate in
/// [`AppError::Operation`] so the failing step stays visible in the message
/// while [`AppError::root`] still exposes the original cause for matching.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found error with entity, field, and value information
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Identifier that is not well-formed for the selected backend
    #[error("Invalid identifier for {entity}: '{value}'")]
    InvalidId { entity: String, value: String },

    /// Malformed paging parameters
    #[error(transparent)]
    Pagination(#[from] PaginationError),

    /// Cache backend failure
    #[error("Cache operation failed: {operation}: {source}")]
    Cache {
        operation: String,
        #[source]
        source: CacheError,
    },

    /// Database operation error with operation context
    #[error("Database operation failed: {operation}: {source}")]
    Database {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Message bus publication failure
    #[error("Publish to topic '{topic}' failed: {source}")]
    Publish {
        topic: String,
        #[source]
        source: anyhow::Error,
    },

    /// Transaction abort that failed after the body or the commit had already failed
    #[error("{source}, tx abort error: {abort_error}")]
    TransactionAborted {
        #[source]
        source: Box<AppError>,
        abort_error: Box<AppError>,
    },

    /// Error wrapped with the name of the operation that produced it
    #[error("{operation}: {source}")]
    Operation {
        operation: String,
        #[source]
        source: Box<AppError>,
    },

    /// Configuration error with key information
    #[error("Configuration error: {key}: {source}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Datastore selection or lifecycle failure
    #[error(transparent)]
    DataStore(#[from] DataStoreError),

    /// Internal error for unexpected failures
    #[error("Internal error: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

/// Stable codes handed to transports so they can map failures to client responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Internal,
    Validation,
    UserNotFound,
    OrderNotFound,
    PageInvalidLimit,
    PageInvalidPage,
    PageInvalidState,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Internal => "LMB_INTERNAL",
            ErrorCode::Validation => "LMB_VALIDATION",
            ErrorCode::UserNotFound => "LMB_USER_NOT_FOUND",
            ErrorCode::OrderNotFound => "LMB_ORDER_NOT_FOUND",
            ErrorCode::PageInvalidLimit => "LMB_PAGE_INVALID_LIMIT",
            ErrorCode::PageInvalidPage => "LMB_PAGE_INVALID_PAGE",
            ErrorCode::PageInvalidState => "LMB_PAGE_INVALID_STATE",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AppError {
    /// Wrap this error with the name of the failing operation.
    pub fn context(self, operation: impl Into<String>) -> Self {
        AppError::Operation {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error below any [`AppError::Operation`] wrappers.
    pub fn root(&self) -> &AppError {
        let mut current = self;
        while let AppError::Operation { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), AppError::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), AppError::Validation { .. })
    }

    /// Classify the error for an outward-facing transport.
    ///
    /// Malformed identifiers are reported as missing entities: an id the
    /// backend can never have issued cannot refer to an existing record.
    pub fn code(&self) -> ErrorCode {
        match self.root() {
            AppError::NotFound { entity, .. } | AppError::InvalidId { entity, .. } => {
                match entity.as_str() {
                    "order" => ErrorCode::OrderNotFound,
                    _ => ErrorCode::UserNotFound,
                }
            }
            AppError::Validation { .. } => ErrorCode::Validation,
            AppError::Pagination(PaginationError::InvalidLimit(_)) => ErrorCode::PageInvalidLimit,
            AppError::Pagination(PaginationError::InvalidPage(_)) => ErrorCode::PageInvalidPage,
            AppError::Pagination(PaginationError::InvalidPageState(_)) => {
                ErrorCode::PageInvalidState
            }
            _ => ErrorCode::Internal,
        }
    }

    pub(crate) fn not_found(entity: &str, field: &str, value: impl Into<String>) -> Self {
        AppError::NotFound {
            entity: entity.to_string(),
            field: field.to_string(),
            value: value.into(),
        }
    }

    pub(crate) fn invalid_id(entity: &str, value: impl Into<String>) -> Self {
        AppError::InvalidId {
            entity: entity.to_string(),
            value: value.into(),
        }
    }

    pub(crate) fn database<E>(operation: &str, source: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        AppError::Database {
            operation: operation.to_string(),
            source: source.into(),
        }
    }
}

/// Attach an operation name to the error side of a result.
pub trait ResultExt<T> {
    fn context(self, operation: &str) -> AppResult<T>;
}

impl<T> ResultExt<T> for AppResult<T> {
    fn context(self, operation: &str) -> AppResult<T> {
        self.map_err(|e| e.context(operation))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let reason = errs
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => e.code.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (field.to_string(), reason)
            })
            .collect();
        fields.sort();

        AppError::Validation {
            field: fields
                .iter()
                .map(|(field, _)| field.as_str())
                .collect::<Vec<_>>()
                .join(","),
            reason: fields
                .iter()
                .map(|(field, reason)| format!("{field}: {reason}"))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let key = error.field().unwrap_or("settings").to_string();
        AppError::Configuration {
            key,
            source: anyhow::Error::new(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
