//! Protobuf wire format for [`Event`]s.
//!
//! ```text
//! Event   { id: string, time: int64 (ns since epoch), command: Command }
//! Command { message_type, topic, udid, authenticate?: Authenticate, token_update?: TokenUpdate }
//! ```
//!
//! The kind-specific sub-message is selected by `message_type`. `CheckOut`
//! and kinds this crate does not know encode the envelope only, and decode
//! back to an envelope-only command instead of failing.

use prost::Message;
use thiserror::Error;
use uuid::Uuid;

use checkin_core::{Authenticate, CheckinCommand, CommandBody, MessageType, TokenUpdate};

use crate::event::Event;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("encode event: {0}")]
    Encode(String),

    #[error("decode event: {0}")]
    Decode(String),
}

#[derive(Clone, PartialEq, Message)]
pub struct EventMessage {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(int64, tag = "2")]
    pub time: i64,
    #[prost(message, optional, tag = "3")]
    pub command: Option<CommandMessage>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CommandMessage {
    #[prost(string, tag = "1")]
    pub message_type: String,
    #[prost(string, tag = "2")]
    pub topic: String,
    #[prost(string, tag = "3")]
    pub udid: String,
    #[prost(message, optional, tag = "4")]
    pub authenticate: Option<AuthenticateMessage>,
    #[prost(message, optional, tag = "5")]
    pub token_update: Option<TokenUpdateMessage>,
}

#[derive(Clone, PartialEq, Message)]
pub struct AuthenticateMessage {
    #[prost(string, tag = "1")]
    pub os_version: String,
    #[prost(string, tag = "2")]
    pub build_version: String,
    #[prost(string, tag = "3")]
    pub serial_number: String,
    #[prost(string, tag = "4")]
    pub imei: String,
    #[prost(string, tag = "5")]
    pub meid: String,
    #[prost(string, tag = "6")]
    pub device_name: String,
    #[prost(bytes = "vec", tag = "7")]
    pub challenge: Vec<u8>,
    #[prost(string, tag = "8")]
    pub model: String,
    #[prost(string, tag = "9")]
    pub model_name: String,
    #[prost(string, tag = "10")]
    pub product_name: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct TokenUpdateMessage {
    #[prost(bytes = "vec", tag = "1")]
    pub token: Vec<u8>,
    #[prost(string, tag = "2")]
    pub push_magic: String,
    #[prost(bytes = "vec", tag = "3")]
    pub unlock_token: Vec<u8>,
    #[prost(bool, tag = "4")]
    pub awaiting_configuration: bool,
    #[prost(string, tag = "5")]
    pub user_id: String,
    #[prost(string, tag = "6")]
    pub user_long_name: String,
    #[prost(string, tag = "7")]
    pub user_short_name: String,
    #[prost(bool, tag = "8")]
    pub not_on_console: bool,
}

/// Serialize an event to protobuf bytes.
pub fn encode(event: &Event) -> Result<Vec<u8>, CodecError> {
    let message = EventMessage {
        id: event.id().to_string(),
        time: event.timestamp_nanos(),
        command: Some(CommandMessage::from(event.command())),
    };

    let mut buf = Vec::with_capacity(message.encoded_len());
    message
        .encode(&mut buf)
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Parse protobuf bytes produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Event, CodecError> {
    let message = EventMessage::decode(bytes).map_err(|e| CodecError::Decode(e.to_string()))?;

    let id = Uuid::parse_str(&message.id)
        .map_err(|e| CodecError::Decode(format!("event id {:?}: {e}", message.id)))?;

    let command = message
        .command
        .map(CheckinCommand::from)
        .unwrap_or_default();

    Ok(Event::from_parts(id, message.time, command))
}

impl From<&CheckinCommand> for CommandMessage {
    fn from(command: &CheckinCommand) -> Self {
        let mut message = CommandMessage {
            message_type: command.message_type.clone(),
            topic: command.topic.clone(),
            udid: command.udid.clone(),
            authenticate: None,
            token_update: None,
        };

        match command.kind() {
            Ok(MessageType::Authenticate) => {
                let fields = command.authenticate_fields().cloned().unwrap_or_default();
                message.authenticate = Some(fields.into());
            }
            Ok(MessageType::TokenUpdate) => {
                let fields = command.token_update_fields().cloned().unwrap_or_default();
                message.token_update = Some(fields.into());
            }
            Ok(MessageType::CheckOut) | Err(_) => {}
        }

        message
    }
}

impl From<CommandMessage> for CheckinCommand {
    fn from(message: CommandMessage) -> Self {
        let body = match message.message_type.parse::<MessageType>() {
            Ok(MessageType::Authenticate) => {
                CommandBody::Authenticate(message.authenticate.unwrap_or_default().into())
            }
            Ok(MessageType::TokenUpdate) => {
                CommandBody::TokenUpdate(message.token_update.unwrap_or_default().into())
            }
            Ok(MessageType::CheckOut) | Err(_) => CommandBody::Empty,
        };

        CheckinCommand {
            message_type: message.message_type,
            topic: message.topic,
            udid: message.udid,
            body,
        }
    }
}

impl From<Authenticate> for AuthenticateMessage {
    fn from(a: Authenticate) -> Self {
        Self {
            os_version: a.os_version,
            build_version: a.build_version,
            serial_number: a.serial_number,
            imei: a.imei,
            meid: a.meid,
            device_name: a.device_name,
            challenge: a.challenge,
            model: a.model,
            model_name: a.model_name,
            product_name: a.product_name,
        }
    }
}

impl From<AuthenticateMessage> for Authenticate {
    fn from(m: AuthenticateMessage) -> Self {
        Self {
            os_version: m.os_version,
            build_version: m.build_version,
            serial_number: m.serial_number,
            imei: m.imei,
            meid: m.meid,
            device_name: m.device_name,
            challenge: m.challenge,
            model: m.model,
            model_name: m.model_name,
            product_name: m.product_name,
        }
    }
}

impl From<TokenUpdate> for TokenUpdateMessage {
    fn from(t: TokenUpdate) -> Self {
        Self {
            token: t.token,
            push_magic: t.push_magic,
            unlock_token: t.unlock_token,
            awaiting_configuration: t.awaiting_configuration,
            user_id: t.user_id,
            user_long_name: t.user_long_name,
            user_short_name: t.user_short_name,
            not_on_console: t.not_on_console,
        }
    }
}

impl From<TokenUpdateMessage> for TokenUpdate {
    fn from(m: TokenUpdateMessage) -> Self {
        Self {
            token: m.token,
            push_magic: m.push_magic,
            unlock_token: m.unlock_token,
            awaiting_configuration: m.awaiting_configuration,
            user_id: m.user_id,
            user_long_name: m.user_long_name,
            user_short_name: m.user_short_name,
            not_on_console: m.not_on_console,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_authenticate() -> CheckinCommand {
        CheckinCommand::authenticate(
            "com.apple.mgmt.External.4e6f5ef7",
            "some-device",
            Authenticate {
                os_version: "10.3.1".to_string(),
                build_version: "14E304".to_string(),
                serial_number: "C02XXXXXXXXX".to_string(),
                imei: "35 000000 000000 0".to_string(),
                meid: "35000000000000".to_string(),
                device_name: "Front Desk iPad".to_string(),
                challenge: vec![0xde, 0xad, 0xbe, 0xef],
                model: "iPad6,11".to_string(),
                model_name: "iPad".to_string(),
                product_name: "iPad6,11".to_string(),
            },
        )
    }

    fn sample_token_update() -> CheckinCommand {
        CheckinCommand::token_update(
            "com.apple.mgmt.External.4e6f5ef7",
            "some-device",
            TokenUpdate {
                token: vec![1, 2, 3, 4, 5],
                push_magic: "0D2B5C5E-2F2B-4C5B-9C0A-6E7A1F0D3B21".to_string(),
                unlock_token: vec![9; 64],
                awaiting_configuration: true,
                user_id: "user-1".to_string(),
                user_long_name: "Jane Appleseed".to_string(),
                user_short_name: "jane".to_string(),
                not_on_console: true,
            },
        )
    }

    #[test]
    fn known_kinds_round_trip() {
        for command in [
            sample_authenticate(),
            sample_token_update(),
            CheckinCommand::check_out("com.apple.mgmt.External.4e6f5ef7", "some-device"),
        ] {
            let event = Event::new(command);
            let bytes = encode(&event).unwrap();
            assert_eq!(decode(&bytes).unwrap(), event);
        }
    }

    #[test]
    fn check_out_encodes_envelope_only() {
        let event = Event::new(CheckinCommand::check_out("t", "dev-1"));
        let message = EventMessage::decode(encode(&event).unwrap().as_slice()).unwrap();
        let command = message.command.unwrap();

        assert_eq!(command.message_type, "CheckOut");
        assert!(command.authenticate.is_none());
        assert!(command.token_update.is_none());
    }

    #[test]
    fn unknown_kind_decodes_to_envelope_only_event() {
        let message = EventMessage {
            id: Uuid::new_v4().to_string(),
            time: 1_500_000_000_000_000_000,
            command: Some(CommandMessage {
                message_type: "Bogus".to_string(),
                topic: "t".to_string(),
                udid: "dev-1".to_string(),
                authenticate: Some(AuthenticateMessage {
                    os_version: "ignored".to_string(),
                    ..Default::default()
                }),
                token_update: None,
            }),
        };

        let event = decode(&message.encode_to_vec()).unwrap();
        assert_eq!(event.message_type(), "Bogus");
        assert_eq!(event.command().udid, "dev-1");
        assert_eq!(event.command().body, CommandBody::Empty);
        assert_eq!(event.timestamp_nanos(), 1_500_000_000_000_000_000);
    }

    #[test]
    fn missing_command_decodes_to_empty_command() {
        let id = Uuid::new_v4();
        let message = EventMessage {
            id: id.to_string(),
            time: 42,
            command: None,
        };

        let event = decode(&message.encode_to_vec()).unwrap();
        assert_eq!(event.id(), id);
        assert_eq!(event.command(), &CheckinCommand::default());
    }

    #[test]
    fn malformed_bytes_fail_to_decode() {
        assert!(matches!(decode(&[0xff, 0xff, 0xff]), Err(CodecError::Decode(_))));
        // Length-delimited field claiming more bytes than present.
        assert!(matches!(decode(&[0x0a, 0x05, b'a']), Err(CodecError::Decode(_))));
    }

    #[test]
    fn non_uuid_id_fails_to_decode() {
        let message = EventMessage {
            id: "not-a-uuid".to_string(),
            time: 1,
            command: None,
        };
        assert!(matches!(
            decode(&message.encode_to_vec()),
            Err(CodecError::Decode(_))
        ));
    }

    fn arb_bytes() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 0..48)
    }

    fn arb_authenticate() -> impl Strategy<Value = Authenticate> {
        (
            (".*", ".*", ".*", ".*", ".*"),
            (".*", arb_bytes(), ".*", ".*", ".*"),
        )
            .prop_map(
                |(
                    (os_version, build_version, serial_number, imei, meid),
                    (device_name, challenge, model, model_name, product_name),
                )| Authenticate {
                    os_version,
                    build_version,
                    serial_number,
                    imei,
                    meid,
                    device_name,
                    challenge,
                    model,
                    model_name,
                    product_name,
                },
            )
    }

    fn arb_token_update() -> impl Strategy<Value = TokenUpdate> {
        (
            (arb_bytes(), ".*", arb_bytes(), any::<bool>()),
            (".*", ".*", ".*", any::<bool>()),
        )
            .prop_map(
                |(
                    (token, push_magic, unlock_token, awaiting_configuration),
                    (user_id, user_long_name, user_short_name, not_on_console),
                )| TokenUpdate {
                    token,
                    push_magic,
                    unlock_token,
                    awaiting_configuration,
                    user_id,
                    user_long_name,
                    user_short_name,
                    not_on_console,
                },
            )
    }

    fn arb_command() -> impl Strategy<Value = CheckinCommand> {
        prop_oneof![
            (".*", ".*", arb_authenticate())
                .prop_map(|(topic, udid, a)| CheckinCommand::authenticate(topic, udid, a)),
            (".*", ".*", arb_token_update())
                .prop_map(|(topic, udid, t)| CheckinCommand::token_update(topic, udid, t)),
            (".*", ".*").prop_map(|(topic, udid)| CheckinCommand::check_out(topic, udid)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: decoding an encoded event yields the same event, field for field.
        #[test]
        fn decode_inverts_encode(command in arb_command()) {
            let event = Event::new(command);
            let bytes = encode(&event).unwrap();
            prop_assert_eq!(decode(&bytes).unwrap(), event);
        }
    }
}
