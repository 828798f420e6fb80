//! Shared rendering of an execution outcome.

use chrono::{DateTime, Duration, Local, Utc};
use cronpilot_core::ExecutionRecord;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The human-facing view of an [`ExecutionRecord`] that every channel
/// renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub job_name: String,
    pub success: bool,
    pub started: String,
    pub finished: String,
    pub duration: String,
    pub output: String,
    pub error: String,
}

impl Summary {
    pub fn from_record(record: &ExecutionRecord) -> Self {
        Self {
            job_name: record.job_name.clone(),
            success: record.success,
            started: format_time(record.started_at),
            finished: format_time(record.finished_at),
            duration: format_duration(record.duration()),
            output: record.output.clone(),
            error: record.error.clone().unwrap_or_default(),
        }
    }

    pub fn status_word(&self) -> &'static str {
        if self.success {
            "succeeded"
        } else {
            "failed"
        }
    }
}

/// Local wall-clock time, second precision.
pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format(TIME_FORMAT).to_string()
}

/// `{n}ms` below one second, otherwise seconds with millisecond precision.
pub fn format_duration(d: Duration) -> String {
    let ms = d.num_milliseconds().max(0);
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.3}s", ms as f64 / 1000.0)
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
pub(crate) fn sample(success: bool) -> Summary {
    Summary {
        job_name: "nightly backup".into(),
        success,
        started: "2024-05-01 02:00:00".into(),
        finished: "2024-05-01 02:00:01".into(),
        duration: "1.250s".into(),
        output: if success { "done".into() } else { String::new() },
        error: if success { String::new() } else { "exit status 2".into() },
    }
}
