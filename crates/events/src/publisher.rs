//! Forwarding of encoded events to a message broker (mechanics only).
//!
//! A [`Publisher`] hands one encoded event to one topic. It is the transport
//! layer *after* the archive: events are archived first, then published, so a
//! failed publish never loses the record.
//!
//! Publishers make a **single attempt** per call. They do not retry, buffer or
//! reorder on their own; delivery beyond one synchronous call is the caller's
//! business. Two events may still reach consumers out of archive order if the
//! broker client reorders them.

use std::sync::Arc;

use thiserror::Error;

/// Publication failed; carries the underlying transport cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("publish to {topic:?} failed: {cause}")]
pub struct PublishError {
    pub topic: String,
    pub cause: String,
}

impl PublishError {
    pub fn new(topic: impl Into<String>, cause: impl ToString) -> Self {
        Self {
            topic: topic.into(),
            cause: cause.to_string(),
        }
    }
}

/// Broker-agnostic publisher.
///
/// ## Thread Safety
///
/// The trait requires `Send + Sync`: one publisher is shared by every
/// in-flight request, and implementations must accept concurrent calls.
pub trait Publisher: Send + Sync {
    /// Publish `payload` to `topic`. One attempt; failures are returned as-is.
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

impl<P> Publisher for Arc<P>
where
    P: Publisher + ?Sized,
{
    fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        (**self).publish(topic, payload)
    }
}
