//! Webhook producer.
//!
//! Each message is POSTed as `{"topic", "key", "value"}`. Key and value are
//! sent as text; non-UTF-8 bytes are replaced.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::json;

use super::{HTTP_CLIENT, Message, MessageProducer, publish_error};
use crate::error::{AppError, AppResult};

pub struct WebhookProducer {
    url: Url,
    timeout: Duration,
}

impl WebhookProducer {
    /// Fails with a configuration error unless `url` is an absolute http(s) URL.
    pub fn new(url: &str, timeout: Duration) -> AppResult<Self> {
        let url = Url::parse(url).map_err(|e| AppError::Configuration {
            key: "bus.publisher.url".to_string(),
            source: e.into(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Configuration {
                key: "bus.publisher.url".to_string(),
                source: anyhow::anyhow!("unsupported scheme '{}'", url.scheme()),
            });
        }

        Ok(Self { url, timeout })
    }
}

fn body(message: &Message) -> serde_json::Value {
    json!({
        "topic": message.topic,
        "key": message.key.as_deref().map(String::from_utf8_lossy),
        "value": String::from_utf8_lossy(&message.value),
    })
}

#[async_trait]
impl MessageProducer for WebhookProducer {
    async fn write(&self, message: Message) -> AppResult<()> {
        let mut request = HTTP_CLIENT.post(self.url.clone()).json(&body(&message));
        if !self.timeout.is_zero() {
            request = request.timeout(self.timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| publish_error(&message.topic, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(publish_error(
                &message.topic,
                anyhow::anyhow!("webhook responded with {status}"),
            ));
        }

        tracing::debug!(topic = %message.topic, status = status.as_u16(), "Message delivered");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
