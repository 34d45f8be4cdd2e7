//! Dispatch between the configured cache backends.

use std::sync::Arc;

use crate::cache::memory::MemoryCache;
use crate::cache::noop::NoOpCache;
use crate::cache::redis::RedisCache;
use crate::cache::{AppCache, CacheError};
use crate::config::settings::{CacheBackend, CacheConfig};

/// Owns one backend chosen from [`CacheConfig`]; cheap to clone.
#[derive(Clone)]
pub struct CacheManager {
    backend: Arc<dyn AppCache>,
    config: CacheConfig,
}

impl CacheManager {
    /// `cache_name` namespaces redis keys. A disabled cache gets [`NoOpCache`].
    pub async fn new(config: CacheConfig, cache_name: &str) -> Result<Self, CacheError> {
        let backend = Self::build_backend(&config, cache_name).await?;
        tracing::debug!(
            enabled = config.enabled,
            backend = ?config.backend,
            cache_name,
            "Cache backend built"
        );
        Ok(Self::with_backend(backend, config))
    }

    async fn build_backend(
        config: &CacheConfig,
        cache_name: &str,
    ) -> Result<Arc<dyn AppCache>, CacheError> {
        if !config.enabled {
            return Ok(Arc::new(NoOpCache));
        }
        Ok(match config.backend {
            CacheBackend::Memory => Arc::new(MemoryCache::new(&config.memory)),
            CacheBackend::Redis => Arc::new(RedisCache::new(&config.redis, cache_name).await?),
        })
    }

    pub fn with_backend(backend: Arc<dyn AppCache>, config: CacheConfig) -> Self {
        Self { backend, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key).await
    }

    pub async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError> {
        self.backend.set(key, value, ttl_seconds).await
    }
}
