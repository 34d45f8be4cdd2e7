//! In-process user cache backed by `cached::TimedSizedCache`.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cached::{Cached, TimedSizedCache};

use crate::cache::{AppCache, CacheError};
use crate::config::settings::MemoryCacheConfig;

type Store = TimedSizedCache<String, Vec<u8>>;

/// Bounded LRU whose entries all expire after `ttl_seconds`.
///
/// The per-call TTL passed to `set` is ignored.
pub struct MemoryCache {
    store: Mutex<Store>,
}

impl MemoryCache {
    pub fn new(config: &MemoryCacheConfig) -> Self {
        Self {
            store: Mutex::new(TimedSizedCache::with_size_and_lifespan(
                config.max_size.max(1),
                Duration::from_secs(config.ttl_seconds),
            )),
        }
    }

    fn with_store<R>(&self, f: impl FnOnce(&mut Store) -> R) -> Result<R, CacheError> {
        let mut store = self
            .store
            .lock()
            .map_err(|e| CacheError::Operation(format!("memory cache poisoned: {e}")))?;
        Ok(f(&mut store))
    }
}

#[async_trait]
impl AppCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.with_store(|store| store.cache_get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>, _: Option<u64>) -> Result<(), CacheError> {
        self.with_store(|store| {
            store.cache_set(key.to_string(), value);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(max_size: usize) -> MemoryCache {
        MemoryCache::new(&MemoryCacheConfig {
            max_size,
            ttl_seconds: 300,
        })
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let cache = cache(10);
        assert_eq!(cache.get("k").await.unwrap(), None);

        cache.set("k", b"v".to_vec(), None).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"v".to_vec()));

        cache.set("k", b"w".to_vec(), Some(1)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(b"w".to_vec()));
    }

    #[tokio::test]
    async fn test_evicts_beyond_capacity() {
        let cache = cache(2);
        for key in ["a", "b", "c"] {
            cache.set(key, key.as_bytes().to_vec(), None).await.unwrap();
        }
        assert_eq!(cache.get("a").await.unwrap(), None);
        assert!(cache.get("c").await.unwrap().is_some());
    }
}
