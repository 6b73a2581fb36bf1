//! Broker-backed publishers.
//!
//! The `Publisher` abstraction and the in-memory implementation live in
//! `checkin-events`; this module provides infrastructure-backed ones.

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(feature = "redis")]
pub use self::redis::RedisPublisher;
