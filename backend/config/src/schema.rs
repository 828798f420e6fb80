//! Cronpilot engine configuration schema.
//!
//! Every field is optional on disk; [`crate::defaults`] fills the gaps and
//! the accessor methods return the effective values.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LOG_LEVEL, DEFAULT_RECONCILE_SECS, DEFAULT_TICK_MILLIS,
    DEFAULT_WEBHOOK_TIMEOUT_SECS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<ExecutorConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify: Option<NotifyConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file holding jobs and execution logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `cronpilot_scheduler=debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for daily-rolling NDJSON files. Console only when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_millis: Option<u64>,
    /// 0 disables periodic reconciliation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconcile_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_timeout_secs: Option<u64>,
    /// Unset means shell commands are not time-limited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifyConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_timeout_secs: Option<u64>,
}

// ---------------------------------------------------------------------------
// Effective values
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database
            .as_ref()
            .and_then(|d| d.path.as_deref())
            .map(PathBuf::from)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .map(PathBuf::from)
    }

    pub fn log_json(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(
            self.scheduler
                .as_ref()
                .and_then(|s| s.tick_millis)
                .unwrap_or(DEFAULT_TICK_MILLIS),
        )
    }

    /// `None` when periodic reconciliation is disabled.
    pub fn reconcile_interval(&self) -> Option<Duration> {
        let secs = self
            .scheduler
            .as_ref()
            .and_then(|s| s.reconcile_secs)
            .unwrap_or(DEFAULT_RECONCILE_SECS);
        (secs > 0).then(|| Duration::from_secs(secs))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(
            self.executor
                .as_ref()
                .and_then(|e| e.http_timeout_secs)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        )
    }

    pub fn shell_timeout(&self) -> Option<Duration> {
        self.executor
            .as_ref()
            .and_then(|e| e.shell_timeout_secs)
            .map(Duration::from_secs)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(
            self.notify
                .as_ref()
                .and_then(|n| n.webhook_timeout_secs)
                .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        )
    }
}
