//! Configuration management
//!
//! Settings are read from TOML layers under `config/` and `LOMBARTER_*`
//! environment variables, see [`ConfigLoader`], and validated before use.

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, BusConfig, CacheBackend, CacheConfig, ConsumerConfig, DatabaseConfig,
    LoggerSettings, MemoryCacheConfig, ProducerConfig, PublisherConfig, PublisherKind,
    RedisCacheConfig, Settings,
};
