//! In-memory publisher for tests/dev.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::publisher::{PublishError, Publisher};

/// One message handed to the publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

/// In-memory publisher.
///
/// - No IO
/// - Keeps published messages for inspection ([`InMemoryPublisher::published`])
/// - [`InMemoryPublisher::bounded`] keeps only the most recent ones, for
///   long-running processes without a broker
#[derive(Debug, Default)]
pub struct InMemoryPublisher {
    published: Mutex<VecDeque<PublishedMessage>>,
    capacity: Option<usize>,
}

impl InMemoryPublisher {
    /// Unbounded; every message is kept.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps at most `capacity` messages, dropping the oldest first.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            published: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: Some(capacity),
        }
    }

    /// Retained messages, oldest first.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published
            .lock()
            .map(|messages| messages.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn published_to(&self, topic: &str) -> Vec<PublishedMessage> {
        self.published()
            .into_iter()
            .filter(|m| m.topic == topic)
            .collect()
    }
}

impl Publisher for InMemoryPublisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let mut published = self
            .published
            .lock()
            .map_err(|_| PublishError::new(topic, "lock poisoned"))?;

        if let Some(capacity) = self.capacity {
            if capacity == 0 {
                tracing::debug!(topic, bytes = payload.len(), "published in memory (discarded)");
                return Ok(());
            }
            while published.len() >= capacity {
                published.pop_front();
            }
        }

        published.push_back(PublishedMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });

        tracing::debug!(topic, bytes = payload.len(), "published in memory");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_call_order() {
        let publisher = InMemoryPublisher::new();

        publisher.publish("mdm.CheckOut", b"one").unwrap();
        publisher.publish("mdm.Authenticate", b"two").unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].topic, "mdm.CheckOut");
        assert_eq!(published[1].payload, b"two");
        assert_eq!(publisher.published_to("mdm.CheckOut")[0].payload, b"one");
    }

    #[test]
    fn bounded_keeps_only_the_latest_messages() {
        let publisher = InMemoryPublisher::bounded(3);
        let payload = vec![0u8; 1024];

        for _ in 0..10_000 {
            publisher.publish("mdm.TokenUpdate", &payload).unwrap();
        }
        publisher.publish("mdm.CheckOut", b"last").unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 3);
        assert_eq!(published[2].topic, "mdm.CheckOut");
        assert_eq!(published[2].payload, b"last");
    }

    #[test]
    fn zero_capacity_retains_nothing() {
        let publisher = InMemoryPublisher::bounded(0);

        publisher.publish("mdm.CheckOut", b"x").unwrap();
        assert!(publisher.published().is_empty());
    }
}
