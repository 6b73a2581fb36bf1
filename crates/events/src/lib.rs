//! Check-in events: the durable record, its wire encoding, and publication.
//!
//! - [`Event`] is built once per accepted command and never changes afterwards.
//! - [`codec`] turns events into self-describing protobuf bytes and back.
//! - [`Publisher`] forwards encoded events to the topic selected by [`routing`].

pub mod clock;
pub mod codec;
pub mod event;
pub mod in_memory_publisher;
pub mod publisher;
pub mod routing;

pub use clock::MonotonicClock;
pub use codec::{decode, encode, CodecError};
pub use event::Event;
pub use in_memory_publisher::{InMemoryPublisher, PublishedMessage};
pub use publisher::{PublishError, Publisher};
pub use routing::{topic_for, AUTHENTICATE_TOPIC, CHECKOUT_TOPIC, TOKEN_UPDATE_TOPIC};
