//! Logging for the ACP MCP server
//!
//! stdout carries the protocol stream, so every layer writes to stderr.

mod redact;
mod subscriber;

pub use redact::{redact_arguments, SENSITIVE_KEYS};
pub use subscriber::{init_subscriber, TelemetryConfig};
