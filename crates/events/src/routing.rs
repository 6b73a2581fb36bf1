//! Topic routing: one fixed topic per check-in kind.

use checkin_core::MessageType;

pub const AUTHENTICATE_TOPIC: &str = "mdm.Authenticate";
pub const TOKEN_UPDATE_TOPIC: &str = "mdm.TokenUpdate";
pub const CHECKOUT_TOPIC: &str = "mdm.CheckOut";

/// Topic that events of `kind` are published to.
pub fn topic_for(kind: MessageType) -> &'static str {
    match kind {
        MessageType::Authenticate => AUTHENTICATE_TOPIC,
        MessageType::TokenUpdate => TOKEN_UPDATE_TOPIC,
        MessageType::CheckOut => CHECKOUT_TOPIC,
    }
}
