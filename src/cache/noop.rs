//! Backend for `cache.enabled = false`.

use async_trait::async_trait;

use crate::cache::{AppCache, CacheError};

/// Stores nothing, so every read is a miss and every write succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCache;

#[async_trait]
impl AppCache for NoOpCache {
    async fn get(&self, _: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _: &str, _: Vec<u8>, _: Option<u64>) -> Result<(), CacheError> {
        Ok(())
    }
}
