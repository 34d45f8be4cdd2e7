use async_trait::async_trait;

use crate::cache::CacheError;

/// Byte store shared by every cache backend.
///
/// Values are opaque here; typed encoding lives in [`crate::cache::CacheStore`].
#[async_trait]
pub trait AppCache: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// `ttl_seconds` overrides the backend default when given.
    async fn set(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl_seconds: Option<u64>,
    ) -> Result<(), CacheError>;
}
