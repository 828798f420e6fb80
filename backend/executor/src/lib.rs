//! Job execution for Cronpilot.
//!
//! Runs a job's command (shell or HTTP), records exactly one
//! [`ExecutionRecord`](cronpilot_core::ExecutionRecord) per run, persists it,
//! then hands it to the notifier.

pub mod executor;
pub mod http;
pub mod shell;

pub use executor::{Executor, ExecutorSettings};
