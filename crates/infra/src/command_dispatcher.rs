//! Check-in pipeline orchestration.
//!
//! ## Execution Flow
//!
//! ```text
//! CheckinCommand
//!   ↓
//! 1. Validate the MessageType tag against the invoked operation
//!   ↓
//! 2. Build the Event (fresh id + monotonic timestamp)
//!   ↓
//! 3. Encode the Event (protobuf)
//!   ↓
//! 4. Archive the bytes under the event timestamp (one transaction)
//!   ↓
//! 5. Publish the same bytes to the kind's topic
//! ```
//!
//! Per request: `Received → Validated → Archived → Published → Acknowledged`.
//! Any failing step ends the request; there is no retry edge.
//!
//! ## Partial Failure
//!
//! Archive and publish form a two-step saga with **no compensation**. If the
//! archive fails, publish is never attempted. If publish fails, the record
//! stays archived and the caller gets [`DispatchError::Publish`]: the event is
//! durably recorded but not forwarded.
//!
//! This module contains no IO itself; it composes the archive and publisher
//! traits.

use thiserror::Error;

use checkin_core::{CheckinCommand, CommandError, MessageType};
use checkin_events::{encode, topic_for, CodecError, Event, PublishError, Publisher};

use crate::archive::{ArchiveError, ArchiveStore};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// The tag names no known kind. Nothing was built or archived.
    #[error("invalid message type: {0:?}")]
    InvalidMessageType(String),

    /// The tag disagrees with the invoked operation. No side effects.
    #[error("expected {expected} message type, got {actual:?}")]
    MessageTypeMismatch {
        expected: MessageType,
        actual: String,
    },

    /// Encoding a freshly built event failed (internal).
    #[error(transparent)]
    Encode(#[from] CodecError),

    /// Archiving failed; publish was not attempted.
    #[error("archive failed: {0}")]
    Storage(#[from] ArchiveError),

    /// Publishing failed after a successful archive; the record stays archived.
    #[error(transparent)]
    Publish(#[from] PublishError),
}

impl From<CommandError> for DispatchError {
    fn from(value: CommandError) -> Self {
        match value {
            CommandError::InvalidMessageType(tag) => DispatchError::InvalidMessageType(tag),
            CommandError::MessageTypeMismatch { expected, actual } => {
                DispatchError::MessageTypeMismatch { expected, actual }
            }
        }
    }
}

impl DispatchError {
    /// Failures of the server rather than of the request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DispatchError::Encode(_) | DispatchError::Storage(_) | DispatchError::Publish(_)
        )
    }

    /// Whether the event reached the archive before the failure.
    pub fn was_archived(&self) -> bool {
        matches!(self, DispatchError::Publish(_))
    }
}

/// The check-in operations, one per message kind.
///
/// Implementations must be safe to share across request handlers.
pub trait CheckinService: Send + Sync {
    fn authenticate(&self, command: CheckinCommand) -> Result<(), DispatchError>;

    fn token_update(&self, command: CheckinCommand) -> Result<(), DispatchError>;

    fn check_out(&self, command: CheckinCommand) -> Result<(), DispatchError>;

    /// Route a command by its tag. Unknown tags fail with
    /// [`DispatchError::InvalidMessageType`] before anything is built.
    fn dispatch(&self, command: CheckinCommand) -> Result<(), DispatchError> {
        match command.kind()? {
            MessageType::Authenticate => self.authenticate(command),
            MessageType::TokenUpdate => self.token_update(command),
            MessageType::CheckOut => self.check_out(command),
        }
    }
}

impl<T> CheckinService for std::sync::Arc<T>
where
    T: CheckinService + ?Sized,
{
    fn authenticate(&self, command: CheckinCommand) -> Result<(), DispatchError> {
        (**self).authenticate(command)
    }

    fn token_update(&self, command: CheckinCommand) -> Result<(), DispatchError> {
        (**self).token_update(command)
    }

    fn check_out(&self, command: CheckinCommand) -> Result<(), DispatchError> {
        (**self).check_out(command)
    }

    fn dispatch(&self, command: CheckinCommand) -> Result<(), DispatchError> {
        (**self).dispatch(command)
    }
}

/// Archive-then-publish pipeline over any [`ArchiveStore`] and [`Publisher`].
///
/// The dispatcher holds no mutable state of its own; concurrency safety comes
/// from the injected archive and publisher.
///
/// ## Generic Parameters
///
/// - `A`: archive store (`RedbArchive` in production, `InMemoryArchive` in tests)
/// - `P`: publisher (`RedisPublisher` in production, `InMemoryPublisher` in tests/dev)
#[derive(Debug)]
pub struct CheckinDispatcher<A, P> {
    archive: A,
    publisher: P,
}

impl<A, P> CheckinDispatcher<A, P> {
    pub fn new(archive: A, publisher: P) -> Self {
        Self { archive, publisher }
    }

    pub fn archive(&self) -> &A {
        &self.archive
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn into_parts(self) -> (A, P) {
        (self.archive, self.publisher)
    }
}

impl<A, P> CheckinDispatcher<A, P>
where
    A: ArchiveStore,
    P: Publisher,
{
    fn archive_and_publish(
        &self,
        kind: MessageType,
        command: CheckinCommand,
    ) -> Result<(), DispatchError> {
        // Received -> Validated
        command.expect_kind(kind)?;

        let event = Event::new(command);
        let key = event.archive_key();
        let span = tracing::info_span!(
            "checkin",
            kind = %kind,
            event_id = %event.id(),
            udid = %event.command().udid,
            key,
        );
        let _entered = span.enter();

        let payload = encode(&event).inspect_err(|e| {
            tracing::error!(error = %e, "event encoding failed");
        })?;

        // Validated -> Archived
        self.archive.append(key, &payload).inspect_err(|e| {
            tracing::error!(error = %e, "archive failed; not publishing");
        })?;
        tracing::debug!(bytes = payload.len(), "archived");

        // Archived -> Published
        let topic = topic_for(kind);
        self.publisher.publish(topic, &payload).inspect_err(|e| {
            tracing::warn!(topic, error = %e, "event archived but not published");
        })?;

        tracing::info!(topic, "check-in processed");
        Ok(())
    }
}

impl<A, P> CheckinService for CheckinDispatcher<A, P>
where
    A: ArchiveStore,
    P: Publisher,
{
    fn authenticate(&self, command: CheckinCommand) -> Result<(), DispatchError> {
        self.archive_and_publish(MessageType::Authenticate, command)
    }

    fn token_update(&self, command: CheckinCommand) -> Result<(), DispatchError> {
        self.archive_and_publish(MessageType::TokenUpdate, command)
    }

    fn check_out(&self, command: CheckinCommand) -> Result<(), DispatchError> {
        self.archive_and_publish(MessageType::CheckOut, command)
    }
}
