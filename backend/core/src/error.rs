use thiserror::Error;

/// Top-level error type for the Cronpilot engine.
#[derive(Debug, Error)]
pub enum CronpilotError {
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("job not found: {0}")]
    JobNotFound(i64),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("scheduler is already running")]
    AlreadyRunning,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CronpilotError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::JobNotFound(_))
    }
}
