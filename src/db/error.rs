//! Datastore error types.

use std::time::Duration;

use thiserror::Error;

/// Errors raised while selecting, building or connecting a datastore.
#[derive(Debug, Error)]
pub enum DataStoreError {
    #[error("unknown datastore '{name}', available: {available}")]
    UnknownBackend { name: String, available: String },

    #[error("invalid database url: {0}")]
    InvalidUrl(String),

    #[error("invalid database name")]
    InvalidDatabaseName,

    #[error("connection to {backend} failed: {source}")]
    Connection {
        backend: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("connection to {backend} timed out after {timeout:?}")]
    ConnectTimeout {
        backend: &'static str,
        timeout: Duration,
    },

    #[error("{0} datastore is not connected")]
    NotConnected(&'static str),
}
