//! Configuration validation logic
//!
//! Every check returns [`ConfigError::ValidationError`] naming the offending
//! dotted field, so a bad file is reported before anything is connected.

use crate::config::error::ConfigError;
use crate::config::settings::{
    BusConfig, CacheBackend, CacheConfig, DatabaseConfig, LoggerSettings, PublisherKind, Settings,
};
use crate::db::DataStoreKind;
use crate::logger::parse_level;
use crate::models::topics::{validate_consumer_topics, validate_producer_topics};

impl DatabaseConfig {
    /// Validate datastore configuration
    ///
    /// # Validation Rules
    /// - `name` must be a registered backend
    /// - `url` must not be empty for `mongo`
    /// - `db` must not be empty
    /// - at least one connect attempt
    pub fn validate(&self) -> Result<(), ConfigError> {
        let kind: DataStoreKind = self.name.parse().map_err(|_| {
            let available = DataStoreKind::available();
            ConfigError::validation(
                "database.name".to_string(),
                format!("Unknown datastore '{}'. Available: {available}", self.name),
            )
        })?;

        if kind == DataStoreKind::Mongo && self.url.trim().is_empty() {
            return Err(ConfigError::validation(
                "database.url",
                "Datastore URL is required for the mongo backend.",
            ));
        }

        if self.db.trim().is_empty() {
            return Err(ConfigError::validation("database.db", "Database name must not be empty."));
        }

        if self.connect_attempts == 0 {
            return Err(ConfigError::validation(
                "database.connect_attempts",
                "Connect attempts must be greater than 0.",
            ));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Validate cache configuration. A disabled cache is not checked.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }

        match self.backend {
            CacheBackend::Memory => {
                if self.memory.max_size == 0 {
                    return Err(ConfigError::validation(
                        "cache.memory.max_size",
                        "Memory cache max size must be greater than 0.",
                    ));
                }
            }
            CacheBackend::Redis => {
                if self.redis.url.trim().is_empty() {
                    return Err(ConfigError::validation(
                        "cache.redis.url",
                        "Redis URL is required when the redis backend is enabled.",
                    ));
                }
                if self.redis.pool_size == 0 {
                    return Err(ConfigError::validation(
                        "cache.redis.pool_size",
                        "Redis pool size must be greater than 0.",
                    ));
                }
            }
        }

        Ok(())
    }
}

impl BusConfig {
    /// Validate topic lists and the publisher.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_consumer_topics(&self.consumer_topics())
            .map_err(|e| ConfigError::validation("bus.consumers".to_string(), e.to_string()))?;

        validate_producer_topics(&self.producer_topics())
            .map_err(|e| ConfigError::validation("bus.producers".to_string(), e.to_string()))?;

        if self.publisher.kind == PublisherKind::Webhook && self.publisher.url.trim().is_empty() {
            return Err(ConfigError::validation(
                "bus.publisher.url",
                "Webhook publisher requires a URL.",
            ));
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_level(&self.level).map_err(|e| ConfigError::ValidationError {
            field: "logger.level".to_string(),
            message: e.to_string(),
        })?;

        self.file.parse_format()?;

        if self.file.enabled && self.file.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "Log file path must not be empty when file logging is enabled.",
            ));
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()?;
        self.cache.validate()?;
        self.bus.validate()?;
        self.logger.validate()?;
        Ok(())
    }
}
