//! `checkin-core`: check-in protocol primitives.
//!
//! This crate contains the **decoded command model** shared by the codec, the
//! dispatcher and the transport adapter (no infrastructure concerns).

pub mod command;
pub mod error;
pub mod message_type;

pub use command::{Authenticate, CheckinCommand, CommandBody, TokenUpdate};
pub use error::{CommandError, CommandResult};
pub use message_type::MessageType;
