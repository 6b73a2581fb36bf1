//! Redis pub/sub publisher (optional).
//!
//! Each check-in topic maps to a Redis channel of the same name. Redis pub/sub
//! is not durable: subscribers that are offline miss messages, and the archive
//! remains the source of truth for replay.

use std::time::Duration;

use redis::Commands;

use checkin_events::{PublishError, Publisher};

/// Default bound on connecting, sending and awaiting the reply.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Publishes encoded events with `PUBLISH <topic> <payload>`.
///
/// Every call opens its own connection, so a stalled broker holds up only the
/// request that hit it, and for at most the configured timeout.
#[derive(Debug, Clone)]
pub struct RedisPublisher {
    client: redis::Client,
    timeout: Duration,
}

impl RedisPublisher {
    pub fn new(redis_url: impl AsRef<str>) -> redis::RedisResult<Self> {
        let client = redis::Client::open(redis_url.as_ref())?;
        Ok(Self {
            client,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn connect(&self) -> redis::RedisResult<redis::Connection> {
        let conn = self.client.get_connection_with_timeout(self.timeout)?;
        conn.set_read_timeout(Some(self.timeout))?;
        conn.set_write_timeout(Some(self.timeout))?;
        Ok(conn)
    }
}

impl Publisher for RedisPublisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        let mut conn = self.connect().map_err(|e| PublishError::new(topic, e))?;

        let receivers: i64 = conn
            .publish(topic, payload)
            .map_err(|e| PublishError::new(topic, e))?;

        tracing::debug!(topic, receivers, bytes = payload.len(), "published to redis");
        Ok(())
    }
}
