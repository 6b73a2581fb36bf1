//! Tracing/logging setup shared by the check-in binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{init, LogFormat, ParseLogFormatError};
