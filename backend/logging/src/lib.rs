//! Structured logging for Cronpilot.
//!
//! Console plus optional daily-rolling NDJSON output, and redaction of
//! webhook secrets and tokens before they reach a log line.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
