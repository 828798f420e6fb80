//! Persistence ports used by the executor and scheduler.
//!
//! Implementations are synchronous: the SQLite backends hold a connection
//! behind a mutex and every call is short.

use crate::error::CronpilotError;
use crate::job::Job;
use crate::record::ExecutionRecord;

/// Read access to job definitions.
pub trait JobStore: Send + Sync {
    /// All jobs with `enabled = true`.
    fn list_enabled(&self) -> Result<Vec<Job>, CronpilotError>;

    /// `Err(CronpilotError::JobNotFound)` when no job has this id.
    fn find_by_id(&self, id: i64) -> Result<Job, CronpilotError>;
}

/// Append-only sink for execution records.
pub trait ExecutionLogStore: Send + Sync {
    /// Persist `record` and return the id assigned to it.
    fn append(&self, record: &ExecutionRecord) -> Result<i64, CronpilotError>;
}
