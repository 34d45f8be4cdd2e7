//! Outbound messages with pluggable producers.
//!
//! The core trait [`MessageProducer`] hides the concrete bus client. Two
//! producers ship with the service: a webhook that POSTs each message as
//! JSON, and a log-only producer for local runs.

mod log;
mod webhook;

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

#[cfg(test)]
use mockall::automock;

use crate::config::settings::{PublisherConfig, PublisherKind};
use crate::error::{AppError, AppResult};

pub use self::log::LogProducer;
pub use self::webhook::WebhookProducer;

/// Shared HTTP client for outbound producers.
static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
});

/// One message bound for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub topic: String,
    pub key: Option<Vec<u8>>,
    pub value: Vec<u8>,
}

impl Message {
    pub fn new(topic: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            key: None,
            value: value.into(),
        }
    }
}

/// Writes messages to the bus.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageProducer: Send + Sync {
    /// Deliver `message`. Fails with [`AppError::Publish`].
    async fn write(&self, message: Message) -> AppResult<()>;

    /// Producer name for logging.
    fn name(&self) -> &'static str;
}

/// Build the producer selected by `config.kind`.
pub fn producer_from_config(config: &PublisherConfig) -> AppResult<Arc<dyn MessageProducer>> {
    let producer: Arc<dyn MessageProducer> = match config.kind {
        PublisherKind::Log => Arc::new(LogProducer::new()),
        PublisherKind::Webhook => Arc::new(WebhookProducer::new(
            &config.url,
            Duration::from_secs(config.timeout_seconds),
        )?),
    };

    tracing::info!(producer = producer.name(), "Message producer ready");
    Ok(producer)
}

fn publish_error(topic: &str, source: impl Into<anyhow::Error>) -> AppError {
    AppError::Publish {
        topic: topic.to_string(),
        source: source.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_from_config() {
        let log = producer_from_config(&PublisherConfig::default()).unwrap();
        assert_eq!(log.name(), "log");

        let webhook = producer_from_config(&PublisherConfig {
            kind: PublisherKind::Webhook,
            url: "http://127.0.0.1:9/hook".to_string(),
            timeout_seconds: 2,
        })
        .unwrap();
        assert_eq!(webhook.name(), "webhook");
    }

    #[test]
    fn test_webhook_requires_valid_url() {
        let err = producer_from_config(&PublisherConfig {
            kind: PublisherKind::Webhook,
            url: String::new(),
            timeout_seconds: 2,
        })
        .err()
        .unwrap();
        assert!(matches!(err, AppError::Configuration { .. }));
    }

    #[test]
    fn test_message_has_no_key_by_default() {
        let message = Message::new("some.topic", "hello");
        assert_eq!(message.key, None);
        assert_eq!(message.value, b"hello".to_vec());
    }
}
