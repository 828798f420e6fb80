//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional JSON formatting,
//! file rotation (NDJSON), and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global structured logger.
///
/// `RUST_LOG` wins over `level` when set. With `log_dir` present a rolling
/// file logger is added next to the console one. The console writes to
/// stderr and `json` switches it to JSON lines; the file is always JSON.
pub fn init_logger(log_dir: Option<&Path>, level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    // Rolling file appender: writes NDJSON to `<dir>/cronpilot.log.YYYY-MM-DD`
    let file_layer = log_dir.map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "cronpilot.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let console_json = json.then(|| {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let console_text = (!json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(true)
    });

    // A second call (tests, embedded use) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_json)
        .with(console_text)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_harmless() {
        let dir = std::env::temp_dir().join("cronpilot-logger-test");
        init_logger(Some(&dir), "debug", false);
        init_logger(None, "info", true);
        tracing::info!(job_id = 1, "logger initialised");
    }
}
