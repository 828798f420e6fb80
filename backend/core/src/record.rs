use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::job::Job;

/// The immutable outcome of one run of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Assigned by the log store; `None` until persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub job_id: i64,
    /// Name at execution time, kept even if the job is renamed or deleted.
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionRecord {
    /// Start building a record for `job`, stamping the start time now.
    pub fn begin(job: &Job) -> RecordBuilder {
        RecordBuilder {
            job_id: job.id,
            job_name: job.name.clone(),
            started_at: Utc::now(),
        }
    }

    pub fn duration(&self) -> Duration {
        self.finished_at - self.started_at
    }
}

/// Holds the start of a run until its outcome is known.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    job_id: i64,
    job_name: String,
    started_at: DateTime<Utc>,
}

impl RecordBuilder {
    pub fn succeeded(self, output: impl Into<String>) -> ExecutionRecord {
        self.finish(true, output.into(), None)
    }

    pub fn failed(self, output: impl Into<String>, error: impl Into<String>) -> ExecutionRecord {
        self.finish(false, output.into(), Some(error.into()))
    }

    /// Stamp the end time. The wall clock can step backwards, so the end is
    /// clamped to the start.
    fn finish(self, success: bool, output: String, error: Option<String>) -> ExecutionRecord {
        let finished_at = Utc::now().max(self.started_at);
        ExecutionRecord {
            id: None,
            job_id: self.job_id,
            job_name: self.job_name,
            started_at: self.started_at,
            finished_at,
            success,
            output,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::NewJob;

    fn job() -> Job {
        serde_json::from_value::<NewJob>(serde_json::json!({
            "name": "backup",
            "schedule": "0 0 2 * * *",
            "command": "true"
        }))
        .unwrap()
        .into_job(3)
    }

    #[test]
    fn end_never_precedes_start() {
        let rec = ExecutionRecord::begin(&job()).succeeded("ok");
        assert!(rec.finished_at >= rec.started_at);
        assert_eq!(rec.duration(), rec.finished_at - rec.started_at);
        assert!(rec.duration() >= Duration::zero());
    }

    #[test]
    fn failure_carries_error_and_snapshot_name() {
        let rec = ExecutionRecord::begin(&job()).failed("", "Invalid command");
        assert!(!rec.success);
        assert_eq!(rec.error.as_deref(), Some("Invalid command"));
        assert_eq!(rec.job_name, "backup");
        assert_eq!(rec.job_id, 3);
        assert!(rec.id.is_none());
    }
}
