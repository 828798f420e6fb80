//! Config validation with user-friendly error messages.

use crate::schema::EngineConfig;
use thiserror::Error;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &EngineConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_database(config, &mut report);
    validate_logging(config, &mut report);
    validate_scheduler(config, &mut report);
    validate_timeouts(config, &mut report);
    report
}

fn validate_database(config: &EngineConfig, report: &mut ValidationReport) {
    let Some(db) = &config.database else { return };
    if let Some(path) = &db.path {
        if path.trim().is_empty() {
            report.error("database.path", "Database path cannot be empty");
        }
    }
}

/// Plain levels are checked; anything with a target directive is left to
/// `EnvFilter`.
fn validate_logging(config: &EngineConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        let plain = !level.contains('=') && !level.contains(',');
        if plain && !LOG_LEVELS.contains(&level.trim().to_ascii_lowercase().as_str()) {
            report.warn(
                "logging.level",
                format!("Unknown log level '{level}'; expected one of {}", LOG_LEVELS.join(", ")),
            );
        }
    }
    if let Some(dir) = &logging.dir {
        if dir.trim().is_empty() {
            report.error("logging.dir", "Log directory cannot be empty; omit it for console only");
        }
    }
}

fn validate_scheduler(config: &EngineConfig, report: &mut ValidationReport) {
    let Some(scheduler) = &config.scheduler else { return };
    if let Some(tick) = scheduler.tick_millis {
        if tick == 0 {
            report.error("scheduler.tick_millis", "tick_millis must be >= 1");
        } else if tick > 1000 {
            report.warn(
                "scheduler.tick_millis",
                format!("A {tick}ms tick is coarser than the one-second cron resolution; firings will be late"),
            );
        }
    }
}

fn validate_timeouts(config: &EngineConfig, report: &mut ValidationReport) {
    if let Some(executor) = &config.executor {
        if executor.http_timeout_secs == Some(0) {
            report.error("executor.http_timeout_secs", "http_timeout_secs must be >= 1");
        }
        if executor.shell_timeout_secs == Some(0) {
            report.error(
                "executor.shell_timeout_secs",
                "shell_timeout_secs must be >= 1; omit it for no limit",
            );
        }
    }
    if let Some(notify) = &config.notify {
        if notify.webhook_timeout_secs == Some(0) {
            report.error("notify.webhook_timeout_secs", "webhook_timeout_secs must be >= 1");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ExecutorConfig, LoggingConfig, SchedulerConfig};

    #[test]
    fn default_config_is_valid() {
        let report = validate(&EngineConfig::default());
        assert!(report.is_valid());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn zero_durations_are_errors() {
        let config = EngineConfig {
            scheduler: Some(SchedulerConfig {
                tick_millis: Some(0),
                reconcile_secs: Some(0),
            }),
            executor: Some(ExecutorConfig {
                http_timeout_secs: Some(0),
                shell_timeout_secs: Some(0),
            }),
            ..Default::default()
        };
        let report = validate(&config);
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "scheduler.tick_millis",
                "executor.http_timeout_secs",
                "executor.shell_timeout_secs"
            ]
        );
    }

    #[test]
    fn odd_values_are_warnings() {
        let config = EngineConfig {
            logging: Some(LoggingConfig {
                level: Some("loud".into()),
                ..Default::default()
            }),
            scheduler: Some(SchedulerConfig {
                tick_millis: Some(5_000),
                reconcile_secs: None,
            }),
            ..Default::default()
        };
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn filter_directives_are_accepted() {
        let config = EngineConfig {
            logging: Some(LoggingConfig {
                level: Some("info,cronpilot_scheduler=debug".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(validate(&config).warnings.is_empty());
    }
}
