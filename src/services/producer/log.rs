use async_trait::async_trait;

use super::{Message, MessageProducer};
use crate::error::AppResult;

/// Producer that only logs. Used when no bus is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProducer;

impl LogProducer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageProducer for LogProducer {
    async fn write(&self, message: Message) -> AppResult<()> {
        tracing::info!(
            topic = %message.topic,
            value = %String::from_utf8_lossy(&message.value),
            "Message published"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds() {
        let producer = LogProducer::new();
        let message = Message::new("some.topic", "x");
        assert!(producer.write(message).await.is_ok());
    }
}
