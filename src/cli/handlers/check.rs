//! `check` command: validate settings without connecting anything.

use crate::config::settings::Settings;
use crate::db::DataStoreKind;
use crate::error::AppResult;

pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> AppResult<()> {
        println!("{}", self.summary()?);
        println!("Configuration is valid");
        Ok(())
    }

    /// Validate and describe what `run` would build.
    pub fn summary(&self) -> AppResult<String> {
        self.config.validate()?;
        let kind: DataStoreKind = self.config.database.name.parse()?;

        let cache = if self.config.cache.enabled {
            format!("{:?}", self.config.cache.backend).to_lowercase()
        } else {
            "disabled".to_string()
        };

        let app = &self.config.application;
        let bus = &self.config.bus;
        let publisher = format!("{:?}", bus.publisher.kind).to_lowercase();
        let consumes = bus.consumer_topics().join(", ");
        let produces = bus.producer_topics().join(", ");

        let lines = [
            format!("application: {} {}", app.name, app.version),
            format!("datastore:   {kind} (db {})", self.config.database.db),
            format!("cache:       {cache}"),
            format!("publisher:   {publisher}"),
            format!("consumes:    {consumes}"),
            format!("produces:    {produces}"),
            format!("log level:   {}", self.config.logger.level),
        ];
        Ok(lines.join("\n"))
    }
}
