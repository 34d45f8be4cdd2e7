//! Cache module providing runtime-configurable caching with multiple backends.
//!
//! This module provides a unified caching interface that supports:
//! - Memory cache (in-process, bounded and timed)
//! - Redis cache (distributed, network-based)
//!
//! # Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "memory"  # or "redis"
//!
//! [cache.memory]
//! max_size = 1000
//! ttl_seconds = 300
//!
//! [cache.redis]
//! url = "redis://127.0.0.1:6379"
//! ttl_seconds = 300
//! pool_size = 4
//! connection_timeout = 5
//! key_prefix = "lombarter"
//! ```
//!
//! Services talk to the typed [`UserCache`] facade rather than raw bytes.

mod error;
mod manager;
mod memory;
mod noop;
mod redis;
mod traits;
mod user_cache;

pub use error::CacheError;
pub use manager::CacheManager;
pub use memory::MemoryCache;
pub use noop::NoOpCache;
pub use traits::AppCache;
pub use user_cache::{CacheStore, UserCache};

#[cfg(test)]
pub use user_cache::MockUserCache;

// Re-export config types
pub use crate::config::settings::{CacheBackend, CacheConfig, MemoryCacheConfig, RedisCacheConfig};
