//! Datastore selection and the concrete backends.
//!
//! [`DataStoreKind`] is the closed set of supported backends. A configured
//! name is resolved to a kind, and the kind builds one adapter implementing
//! every contract in [`crate::repositories`].

mod error;
pub mod memory;
pub mod mongo;

pub use error::DataStoreError;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};

use crate::config::settings::DatabaseConfig;
use crate::error::AppResult;
use crate::repositories::DataStore;

use self::memory::MemoryStore;
use self::mongo::MongoStore;

/// Supported datastore backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataStoreKind {
    /// MongoDB document store, offset pagination
    Mongo,
    /// In-process store, cursor pagination
    Memory,
}

/// Comma-separated list of every accepted backend name.
static AVAILABLE: LazyLock<String> = LazyLock::new(|| {
    DataStoreKind::ALL
        .iter()
        .map(DataStoreKind::as_str)
        .collect::<Vec<_>>()
        .join(", ")
});

impl DataStoreKind {
    pub const ALL: [DataStoreKind; 2] = [DataStoreKind::Mongo, DataStoreKind::Memory];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataStoreKind::Mongo => "mongo",
            DataStoreKind::Memory => "memory",
        }
    }

    pub fn available() -> &'static str {
        AVAILABLE.as_str()
    }

    /// Construct the backend. No connection is made until [`crate::repositories::Base::connect`].
    pub async fn build(self, config: &DatabaseConfig) -> AppResult<Arc<dyn DataStore>> {
        let store: Arc<dyn DataStore> = match self {
            DataStoreKind::Mongo => Arc::new(MongoStore::new(config).await?),
            DataStoreKind::Memory => Arc::new(MemoryStore::new()),
        };
        Ok(store)
    }
}

impl FromStr for DataStoreKind {
    type Err = DataStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DataStoreKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DataStoreError::UnknownBackend {
                name: s.to_string(),
                available: DataStoreKind::available().to_string(),
            })
    }
}

impl fmt::Display for DataStoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build the datastore selected by `config.name`.
pub async fn new_datastore(config: &DatabaseConfig) -> AppResult<Arc<dyn DataStore>> {
    let kind: DataStoreKind = config.name.parse()?;
    tracing::debug!(backend = %kind, db = %config.db, "Building datastore");
    kind.build(config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(
            "mongo".parse::<DataStoreKind>().unwrap(),
            DataStoreKind::Mongo
        );
        assert_eq!(
            "memory".parse::<DataStoreKind>().unwrap(),
            DataStoreKind::Memory
        );
    }

    #[test]
    fn test_unknown_name_lists_every_backend() {
        let err = "cassandra".parse::<DataStoreKind>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("cassandra"));
        for kind in DataStoreKind::ALL {
            assert!(message.contains(kind.as_str()), "missing {kind} in {message}");
        }
        assert_eq!(DataStoreKind::available(), "mongo, memory");
    }

    #[tokio::test]
    async fn test_new_datastore_memory() {
        let config = DatabaseConfig {
            name: "memory".to_string(),
            ..Default::default()
        };
        let store = new_datastore(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn test_new_datastore_unknown() {
        let config = DatabaseConfig {
            name: "postgres".to_string(),
            ..Default::default()
        };
        let err = new_datastore(&config).await.err().unwrap();
        assert!(matches!(
            err,
            AppError::DataStore(DataStoreError::UnknownBackend { .. })
        ));
    }

    #[tokio::test]
    async fn test_mongo_requires_url_and_database() {
        let config = DatabaseConfig {
            name: "mongo".to_string(),
            url: String::new(),
            ..Default::default()
        };
        let err = new_datastore(&config).await.err().unwrap();
        assert!(matches!(err, AppError::DataStore(DataStoreError::InvalidUrl(_))));

        let config = DatabaseConfig {
            name: "mongo".to_string(),
            url: "mongodb://localhost:27017".to_string(),
            db: String::new(),
            ..Default::default()
        };
        let err = new_datastore(&config).await.err().unwrap();
        assert!(matches!(
            err,
            AppError::DataStore(DataStoreError::InvalidDatabaseName)
        ));
    }
}
