//! Message bus topics and the check that a configuration names exactly them.

use std::collections::HashSet;

use thiserror::Error;

/// Topic consumed by the service.
pub const USER_UPDATE_TOPIC: &str = "user.update";

/// Topic user update notifications are published to.
pub const NOTIFICATION_TOPIC: &str = "some.topic";

const CONSUMER_TOPICS: &[&str] = &[USER_UPDATE_TOPIC];
const PRODUCER_TOPICS: &[&str] = &[NOTIFICATION_TOPIC];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    #[error("topic not found: {0}")]
    NotFound(String),

    #[error("topic count mismatch: {required}!={configured}")]
    CountMismatch { required: usize, configured: usize },
}

pub fn validate_consumer_topics<S: AsRef<str>>(configured: &[S]) -> Result<(), TopicError> {
    validate_topics(configured, CONSUMER_TOPICS)
}

pub fn validate_producer_topics<S: AsRef<str>>(configured: &[S]) -> Result<(), TopicError> {
    validate_topics(configured, PRODUCER_TOPICS)
}

/// Require the distinct configured topics to be exactly `required`.
///
/// Extra topics fail the count check even when every required topic is present.
pub fn validate_topics<S: AsRef<str>>(
    configured: &[S],
    required: &[&str],
) -> Result<(), TopicError> {
    let set: HashSet<&str> = configured.iter().map(AsRef::as_ref).collect();

    if let Some(missing) = required.iter().find(|topic| !set.contains(*topic)) {
        return Err(TopicError::NotFound(missing.to_string()));
    }

    if set.len() != required.len() {
        return Err(TopicError::CountMismatch {
            required: required.len(),
            configured: set.len(),
        });
    }

    Ok(())
}
