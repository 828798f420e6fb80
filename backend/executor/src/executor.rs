use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{error, info, warn};

use cronpilot_core::{CronpilotError, ExecutionLogStore, ExecutionRecord, Job, JobKind, JobStore};
use cronpilot_notify::Notifier;

use crate::{http, shell};

/// Output and error text of a failed run.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub output: String,
    pub error: String,
}

impl Failure {
    pub fn new(output: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub http_timeout: Duration,
    /// `None` lets shell commands run unbounded.
    pub shell_timeout: Option<Duration>,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(30),
            shell_timeout: None,
        }
    }
}

/// Runs jobs and records their outcome.
///
/// Every run produces exactly one [`ExecutionRecord`]. It is appended to the
/// log store before the notifier sees it; neither step can fail the run.
pub struct Executor {
    jobs: Arc<dyn JobStore>,
    logs: Arc<dyn ExecutionLogStore>,
    notifier: Notifier,
    http_client: Client,
    shell_timeout: Option<Duration>,
}

impl Executor {
    pub fn new(
        jobs: Arc<dyn JobStore>,
        logs: Arc<dyn ExecutionLogStore>,
        notifier: Notifier,
        settings: ExecutorSettings,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(settings.http_timeout)
            .build()
            .context("failed to build job HTTP client")?;
        Ok(Self {
            jobs,
            logs,
            notifier,
            http_client,
            shell_timeout: settings.shell_timeout,
        })
    }

    /// Entry point for scheduled firings.
    ///
    /// The job is re-read so edits made since it was scheduled take effect;
    /// if that read fails the scheduling-time snapshot is used.
    pub async fn run_scheduled(&self, snapshot: &Job) -> ExecutionRecord {
        let job = match self.jobs.find_by_id(snapshot.id) {
            Ok(job) => job,
            Err(e) => {
                warn!(job_id = snapshot.id, error = %e, "Re-fetch failed, running scheduled snapshot");
                snapshot.clone()
            }
        };
        self.execute(&job).await
    }

    /// Run a job immediately, outside the schedule.
    pub async fn run_now(&self, job_id: i64) -> Result<ExecutionRecord, CronpilotError> {
        let job = self.jobs.find_by_id(job_id)?;
        info!(job_id, job = %job.name, "Manual run requested");
        Ok(self.execute(&job).await)
    }

    async fn execute(&self, job: &Job) -> ExecutionRecord {
        let builder = ExecutionRecord::begin(job);
        info!(job_id = job.id, job = %job.name, kind = ?job.kind(), "Executing job");

        let outcome = match job.kind() {
            JobKind::Http => http::run(&self.http_client, job).await,
            JobKind::Shell => shell::run(&job.command, self.shell_timeout).await,
        };

        let mut record = match outcome {
            Ok(output) => builder.succeeded(output),
            Err(Failure { output, error }) => builder.failed(output, error),
        };

        if record.success {
            info!(job_id = job.id, duration_ms = record.duration().num_milliseconds(), "Job succeeded");
        } else {
            warn!(
                job_id = job.id,
                duration_ms = record.duration().num_milliseconds(),
                error = record.error.as_deref().unwrap_or(""),
                "Job failed"
            );
        }

        match self.logs.append(&record) {
            Ok(id) => record.id = Some(id),
            Err(e) => error!(job_id = job.id, error = %e, "Failed to persist execution record"),
        }

        self.notifier.maybe_notify(job, &record).await;
        record
    }
}
