//! Property-list request body and its mapping to [`CheckinCommand`].
//!
//! Devices send one flat dictionary per check-in. Keys for every kind are
//! accepted; only the ones belonging to the tagged kind end up in the command.

use checkin_core::{Authenticate, CheckinCommand, CommandBody, MessageType, TokenUpdate};
use plist::Data;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckinRequest {
    #[serde(rename = "MessageType")]
    pub message_type: String,
    #[serde(rename = "Topic")]
    pub topic: String,
    #[serde(rename = "UDID")]
    pub udid: String,

    // Authenticate
    #[serde(rename = "OSVersion")]
    pub os_version: String,
    #[serde(rename = "BuildVersion")]
    pub build_version: String,
    #[serde(rename = "SerialNumber")]
    pub serial_number: String,
    #[serde(rename = "IMEI")]
    pub imei: String,
    #[serde(rename = "MEID")]
    pub meid: String,
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "Challenge", skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Data>,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "ModelName")]
    pub model_name: String,
    #[serde(rename = "ProductName")]
    pub product_name: String,

    // TokenUpdate
    #[serde(rename = "Token", skip_serializing_if = "Option::is_none")]
    pub token: Option<Data>,
    #[serde(rename = "PushMagic")]
    pub push_magic: String,
    #[serde(rename = "UnlockToken", skip_serializing_if = "Option::is_none")]
    pub unlock_token: Option<Data>,
    #[serde(rename = "AwaitingConfiguration")]
    pub awaiting_configuration: bool,
    #[serde(rename = "UserID")]
    pub user_id: String,
    #[serde(rename = "UserLongName")]
    pub user_long_name: String,
    #[serde(rename = "UserShortName")]
    pub user_short_name: String,
    #[serde(rename = "NotOnConsole")]
    pub not_on_console: bool,
}

impl CheckinRequest {
    pub fn from_plist(bytes: &[u8]) -> Result<Self, plist::Error> {
        plist::from_bytes(bytes)
    }
}

fn bytes(data: Option<Data>) -> Vec<u8> {
    data.map(Vec::from).unwrap_or_default()
}

impl From<CheckinRequest> for CheckinCommand {
    fn from(req: CheckinRequest) -> Self {
        // Unknown tags keep the envelope; the dispatcher rejects them.
        let body = match req.message_type.parse::<MessageType>() {
            Ok(MessageType::Authenticate) => CommandBody::Authenticate(Authenticate {
                os_version: req.os_version,
                build_version: req.build_version,
                serial_number: req.serial_number,
                imei: req.imei,
                meid: req.meid,
                device_name: req.device_name,
                challenge: bytes(req.challenge),
                model: req.model,
                model_name: req.model_name,
                product_name: req.product_name,
            }),
            Ok(MessageType::TokenUpdate) => CommandBody::TokenUpdate(TokenUpdate {
                token: bytes(req.token),
                push_magic: req.push_magic,
                unlock_token: bytes(req.unlock_token),
                awaiting_configuration: req.awaiting_configuration,
                user_id: req.user_id,
                user_long_name: req.user_long_name,
                user_short_name: req.user_short_name,
                not_on_console: req.not_on_console,
            }),
            Ok(MessageType::CheckOut) | Err(_) => CommandBody::Empty,
        };

        CheckinCommand {
            message_type: req.message_type,
            topic: req.topic,
            udid: req.udid,
            body,
        }
    }
}
