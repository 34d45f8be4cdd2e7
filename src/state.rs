//! Application state.
//!
//! Owns the connected datastore and the services built on top of it.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheManager, CacheStore, UserCache};
use crate::config::settings::Settings;
use crate::db::new_datastore;
use crate::error::{AppError, AppResult, ResultExt};
use crate::repositories::DataStore;
use crate::retry::do_with_tries;
use crate::services::{Services, producer_from_config};

const USER_CACHE_NAME: &str = "users";

/// Shared state for the running process.
///
/// Cloning is cheap, every member is an `Arc` underneath.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DataStore>,
    pub services: Services,
}

impl AppState {
    /// Build the datastore selected by `database.name`, connect it with the
    /// configured retries, then wire the cache, producer and services.
    pub async fn build(settings: &Settings) -> AppResult<Self> {
        let store = new_datastore(&settings.database).await?;

        let attempts = settings.database.connect_attempts;
        let delay = Duration::from_secs(settings.database.connect_retry_delay);
        do_with_tries(attempts, delay, || store.connect())
            .await
            .context("connect datastore")?;

        Self::from_store(store, settings).await
    }

    /// Wire services over an already connected `store`.
    ///
    /// The store is closed again when any later step fails.
    pub async fn from_store(store: Arc<dyn DataStore>, settings: &Settings) -> AppResult<Self> {
        match Self::services(store.as_ref(), settings).await {
            Ok(services) => Ok(Self { store, services }),
            Err(e) => {
                if let Err(close_error) = store.close().await {
                    tracing::warn!(
                        backend = store.name(),
                        error = %close_error,
                        "Failed to close datastore after setup error"
                    );
                }
                Err(e)
            }
        }
    }

    async fn services(store: &dyn DataStore, settings: &Settings) -> AppResult<Services> {
        let manager = CacheManager::new(settings.cache.clone(), USER_CACHE_NAME)
            .await
            .map_err(|source| AppError::Cache {
                operation: "init cache".to_string(),
                source,
            })?;
        tracing::info!(
            enabled = manager.is_enabled(),
            backend = ?settings.cache.backend,
            "Cache initialized"
        );
        let cache: Arc<dyn UserCache> = Arc::new(CacheStore::new(manager));

        let producer = producer_from_config(&settings.bus.publisher)?;

        Ok(Services::new(store, cache, producer))
    }

    /// Close the datastore, giving up after `grace`.
    pub async fn shutdown(&self, grace: Duration) -> AppResult<()> {
        match tokio::time::timeout(grace, self.store.close()).await {
            Ok(result) => result.context("close datastore"),
            Err(_) => Err(AppError::Internal {
                source: anyhow::anyhow!(
                    "closing {} did not finish within {grace:?}",
                    self.store.name()
                ),
            }),
        }
    }
}
