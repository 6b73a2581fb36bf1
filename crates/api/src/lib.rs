//! HTTP transport for MDM check-in messages.

pub mod app;
pub mod config;
pub mod middleware;
