//! Decoded check-in commands.
//!
//! A command is the short-lived input of the pipeline: produced by the
//! transport adapter for each inbound request and consumed by the dispatcher.
//!
//! Every command carries the common envelope (`message_type`, `topic`,
//! `udid`). Kind-specific fields live in [`CommandBody`]; `CheckOut` and any
//! kind this crate does not know about carry the envelope only.

use serde::{Deserialize, Serialize};

use crate::error::{CommandError, CommandResult};
use crate::message_type::MessageType;

/// Device identity and build metadata sent with `Authenticate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authenticate {
    pub os_version: String,
    pub build_version: String,
    pub serial_number: String,
    pub imei: String,
    pub meid: String,
    pub device_name: String,
    pub challenge: Vec<u8>,
    pub model: String,
    pub model_name: String,
    pub product_name: String,
}

/// Push-messaging registration data sent with `TokenUpdate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUpdate {
    pub token: Vec<u8>,
    pub push_magic: String,
    pub unlock_token: Vec<u8>,
    pub awaiting_configuration: bool,
    pub user_id: String,
    pub user_long_name: String,
    pub user_short_name: String,
    pub not_on_console: bool,
}

/// Kind-specific part of a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandBody {
    Authenticate(Authenticate),
    TokenUpdate(TokenUpdate),
    /// `CheckOut`, or a kind without a known payload shape.
    #[default]
    Empty,
}

impl CommandBody {
    pub fn name(&self) -> &'static str {
        match self {
            CommandBody::Authenticate(_) => "Authenticate",
            CommandBody::TokenUpdate(_) => "TokenUpdate",
            CommandBody::Empty => "Empty",
        }
    }

    /// Whether this is the body shape a `kind` command carries.
    pub fn fits(&self, kind: MessageType) -> bool {
        matches!(
            (kind, self),
            (MessageType::Authenticate, CommandBody::Authenticate(_))
                | (MessageType::TokenUpdate, CommandBody::TokenUpdate(_))
                | (MessageType::CheckOut, CommandBody::Empty)
        )
    }
}

/// A decoded check-in command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinCommand {
    /// Kind tag exactly as received. Kept as data so that mismatches and
    /// unknown kinds can be reported instead of being lost in parsing.
    pub message_type: String,
    /// Push-notification topic of the device.
    pub topic: String,
    /// Unique device identifier.
    pub udid: String,
    pub body: CommandBody,
}

impl CheckinCommand {
    pub fn authenticate(
        topic: impl Into<String>,
        udid: impl Into<String>,
        fields: Authenticate,
    ) -> Self {
        Self {
            message_type: MessageType::Authenticate.as_str().to_string(),
            topic: topic.into(),
            udid: udid.into(),
            body: CommandBody::Authenticate(fields),
        }
    }

    pub fn token_update(
        topic: impl Into<String>,
        udid: impl Into<String>,
        fields: TokenUpdate,
    ) -> Self {
        Self {
            message_type: MessageType::TokenUpdate.as_str().to_string(),
            topic: topic.into(),
            udid: udid.into(),
            body: CommandBody::TokenUpdate(fields),
        }
    }

    pub fn check_out(topic: impl Into<String>, udid: impl Into<String>) -> Self {
        Self::envelope_only(MessageType::CheckOut.as_str(), topic, udid)
    }

    /// A command with no kind-specific payload, for any tag.
    pub fn envelope_only(
        message_type: impl Into<String>,
        topic: impl Into<String>,
        udid: impl Into<String>,
    ) -> Self {
        Self {
            message_type: message_type.into(),
            topic: topic.into(),
            udid: udid.into(),
            body: CommandBody::Empty,
        }
    }

    /// Classify the command by its tag.
    pub fn kind(&self) -> CommandResult<MessageType> {
        self.message_type.parse()
    }

    /// Fails with [`CommandError::MessageTypeMismatch`] unless the tag names
    /// `expected` and the body has that kind's shape.
    pub fn expect_kind(&self, expected: MessageType) -> CommandResult<()> {
        if !expected.matches(&self.message_type) {
            return Err(CommandError::mismatch(expected, self.message_type.clone()));
        }
        if !self.body.fits(expected) {
            return Err(CommandError::mismatch(
                expected,
                format!("{} with {} body", self.message_type, self.body.name()),
            ));
        }
        Ok(())
    }

    pub fn authenticate_fields(&self) -> Option<&Authenticate> {
        match &self.body {
            CommandBody::Authenticate(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn token_update_fields(&self) -> Option<&TokenUpdate> {
        match &self.body {
            CommandBody::TokenUpdate(fields) => Some(fields),
            _ => None,
        }
    }
}
