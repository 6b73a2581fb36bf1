//! The closed set of check-in message kinds.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::CommandError;

/// Kind of a check-in message, as carried in the `MessageType` tag.
///
/// The tag travels as a free-form string on the wire; this enum is the closed
/// view used once a command has been classified.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    Authenticate,
    TokenUpdate,
    CheckOut,
}

impl MessageType {
    pub const ALL: [MessageType; 3] = [
        MessageType::Authenticate,
        MessageType::TokenUpdate,
        MessageType::CheckOut,
    ];

    /// Wire spelling of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Authenticate => "Authenticate",
            MessageType::TokenUpdate => "TokenUpdate",
            MessageType::CheckOut => "CheckOut",
        }
    }

    /// Whether `tag` spells this kind exactly (tags are case-sensitive).
    pub fn matches(&self, tag: &str) -> bool {
        self.as_str() == tag
    }
}

impl core::fmt::Display for MessageType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageType::ALL
            .into_iter()
            .find(|kind| kind.matches(s))
            .ok_or_else(|| CommandError::invalid_message_type(s))
    }
}
