//! Reusable job templates and typed override patches.

use serde::{Deserialize, Serialize};

use crate::job::NewJob;

/// The reusable part of a job definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub schedule: String,
    pub command: String,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub headers: String,
    #[serde(default)]
    pub notify_on_success: bool,
    #[serde(default = "default_true")]
    pub notify_on_failure: bool,
    #[serde(default)]
    pub notification_channels: String,
    #[serde(default)]
    pub notification_config: String,
}

/// Overrides applied when a template is instantiated. `None` keeps the
/// template's value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPatch {
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub notify_on_success: Option<bool>,
    #[serde(default)]
    pub notify_on_failure: Option<bool>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        *self == JobPatch::default()
    }

    /// Apply every present override to `job`.
    pub fn apply(&self, job: &mut NewJob) {
        // Destructured so a new field cannot be silently ignored.
        let JobPatch {
            schedule,
            command,
            method,
            headers,
            description,
            notify_on_success,
            notify_on_failure,
        } = self;

        if let Some(v) = schedule {
            job.schedule = v.clone();
        }
        if let Some(v) = command {
            job.command = v.clone();
        }
        if let Some(v) = method {
            job.method = v.clone();
        }
        if let Some(v) = headers {
            job.headers = v.clone();
        }
        if let Some(v) = description {
            job.description = v.clone();
        }
        if let Some(v) = notify_on_success {
            job.notify_on_success = *v;
        }
        if let Some(v) = notify_on_failure {
            job.notify_on_failure = *v;
        }
    }
}

impl JobTemplate {
    /// Build a new job named `name` from this template with `patch` applied.
    pub fn instantiate(&self, name: impl Into<String>, enabled: bool, patch: &JobPatch) -> NewJob {
        let mut job = NewJob {
            name: name.into(),
            schedule: self.schedule.clone(),
            command: self.command.clone(),
            method: self.method.clone(),
            headers: self.headers.clone(),
            enabled,
            description: self.description.clone(),
            notify_on_success: self.notify_on_success,
            notify_on_failure: self.notify_on_failure,
            notification_channels: self.notification_channels.clone(),
            notification_config: self.notification_config.clone(),
        };
        patch.apply(&mut job);
        job
    }
}

fn default_true() -> bool {
    true
}
