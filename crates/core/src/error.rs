//! Command classification errors.

use thiserror::Error;

use crate::message_type::MessageType;

/// Result type used when classifying commands.
pub type CommandResult<T> = Result<T, CommandError>;

/// Errors raised before any event is built from a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The `MessageType` tag names no known check-in kind.
    #[error("invalid message type: {0:?}")]
    InvalidMessageType(String),

    /// The tag disagrees with the operation that was invoked.
    #[error("expected {expected} message type, got {actual:?}")]
    MessageTypeMismatch {
        expected: MessageType,
        actual: String,
    },
}

impl CommandError {
    pub fn invalid_message_type(tag: impl Into<String>) -> Self {
        Self::InvalidMessageType(tag.into())
    }

    pub fn mismatch(expected: MessageType, actual: impl Into<String>) -> Self {
        Self::MessageTypeMismatch {
            expected,
            actual: actual.into(),
        }
    }
}
