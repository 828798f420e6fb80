use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::notification::{parse_channels, Channel, NotificationConfig};

/// Method used for URL commands when the job leaves it blank.
pub const DEFAULT_HTTP_METHOD: &str = "GET";

/// A persisted job definition.
///
/// `headers`, `notification_channels` and `notification_config` are JSON
/// strings stored inline on the row; they are only decoded at use time so a
/// malformed value degrades that single feature instead of the whole job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i64,
    pub name: String,
    /// Six-field cron expression (sec min hour dom mon dow).
    pub schedule: String,
    /// Shell command line, or an absolute `http://` / `https://` URL.
    pub command: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notify_on_success: bool,
    #[serde(default = "default_true")]
    pub notify_on_failure: bool,
    #[serde(default)]
    pub notification_channels: String,
    #[serde(default)]
    pub notification_config: String,
}

/// How a job's command is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Http,
    Shell,
}

impl Job {
    /// Classification is by prefix only.
    pub fn kind(&self) -> JobKind {
        if self.command.starts_with("http://") || self.command.starts_with("https://") {
            JobKind::Http
        } else {
            JobKind::Shell
        }
    }

    /// HTTP method with the GET fallback applied.
    pub fn http_method(&self) -> &str {
        let method = self.method.trim();
        if method.is_empty() {
            DEFAULT_HTTP_METHOD
        } else {
            method
        }
    }

    /// Decode the serialized header map. An empty field is an empty map.
    pub fn header_map(&self) -> Result<HashMap<String, String>, serde_json::Error> {
        if self.headers.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&self.headers)
    }

    /// Decode the channel list; see [`parse_channels`].
    pub fn channels(&self) -> Result<Vec<Result<Channel, String>>, serde_json::Error> {
        parse_channels(&self.notification_channels)
    }

    /// Decode the notification config. `Ok(None)` when the field is blank.
    pub fn notification(&self) -> Result<Option<NotificationConfig>, serde_json::Error> {
        if self.notification_config.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&self.notification_config).map(Some)
    }

    /// Whether an outcome with the given success flag warrants a notification.
    pub fn wants_notification(&self, success: bool) -> bool {
        (success && self.notify_on_success) || (!success && self.notify_on_failure)
    }
}

/// A job that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub name: String,
    pub schedule: String,
    pub command: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notify_on_success: bool,
    #[serde(default = "default_true")]
    pub notify_on_failure: bool,
    #[serde(default)]
    pub notification_channels: String,
    #[serde(default)]
    pub notification_config: String,
}

impl NewJob {
    pub fn into_job(self, id: i64) -> Job {
        let NewJob {
            name,
            schedule,
            command,
            method,
            headers,
            enabled,
            description,
            notify_on_success,
            notify_on_failure,
            notification_channels,
            notification_config,
        } = self;
        Job {
            id,
            name,
            schedule,
            command,
            method,
            headers,
            enabled,
            description,
            notify_on_success,
            notify_on_failure,
            notification_channels,
            notification_config,
        }
    }
}

fn default_method() -> String {
    DEFAULT_HTTP_METHOD.to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(command: &str) -> Job {
        NewJob {
            name: "t".into(),
            schedule: "* * * * * *".into(),
            command: command.into(),
            method: String::new(),
            headers: String::new(),
            enabled: true,
            description: String::new(),
            notify_on_success: false,
            notify_on_failure: true,
            notification_channels: String::new(),
            notification_config: String::new(),
        }
        .into_job(1)
    }

    #[test]
    fn classifies_by_prefix_only() {
        assert_eq!(job("https://example.test/ping").kind(), JobKind::Http);
        assert_eq!(job("http://example.test").kind(), JobKind::Http);
        assert_eq!(job("curl https://example.test").kind(), JobKind::Shell);
        assert_eq!(job("HTTP://example.test").kind(), JobKind::Shell);
        assert_eq!(job("").kind(), JobKind::Shell);
    }

    #[test]
    fn blank_method_falls_back_to_get() {
        let mut j = job("https://example.test");
        assert_eq!(j.http_method(), "GET");
        j.method = "POST".into();
        assert_eq!(j.http_method(), "POST");
    }

    #[test]
    fn header_map_handles_blank_and_garbage() {
        let mut j = job("https://example.test");
        assert!(j.header_map().unwrap().is_empty());
        j.headers = r#"{"X-Token":"abc"}"#.into();
        assert_eq!(j.header_map().unwrap().get("X-Token").map(String::as_str), Some("abc"));
        j.headers = "not json".into();
        assert!(j.header_map().is_err());
    }

    #[test]
    fn notification_policy() {
        let mut j = job("true");
        assert!(j.wants_notification(false));
        assert!(!j.wants_notification(true));
        j.notify_on_success = true;
        j.notify_on_failure = false;
        assert!(j.wants_notification(true));
        assert!(!j.wants_notification(false));
    }

    #[test]
    fn deserialize_applies_row_defaults() {
        let j: Job = serde_json::from_str(
            r#"{"id":7,"name":"n","schedule":"0 * * * * *","command":"echo hi"}"#,
        )
        .unwrap();
        assert_eq!(j.method, "GET");
        assert!(j.enabled);
        assert!(j.notify_on_failure);
        assert!(!j.notify_on_success);
    }
}
