//! Config defaults: applies default values to parsed config.

use std::path::Path;

use crate::schema::{
    DatabaseConfig, EngineConfig, ExecutorConfig, LoggingConfig, NotifyConfig, SchedulerConfig,
};

pub const DEFAULT_DB_FILE: &str = "cronpilot.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_TICK_MILLIS: u64 = 1000;
pub const DEFAULT_RECONCILE_SECS: u64 = 30;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// Apply all defaults to a freshly loaded config. The database lives in
/// `config_dir` unless a path is configured.
pub fn apply_all_defaults(config: EngineConfig, config_dir: &Path) -> EngineConfig {
    let config = apply_database_defaults(config, config_dir);
    let config = apply_logging_defaults(config);
    let config = apply_scheduler_defaults(config);
    let config = apply_executor_defaults(config);
    apply_notify_defaults(config)
}

fn apply_database_defaults(mut config: EngineConfig, config_dir: &Path) -> EngineConfig {
    let database = config.database.get_or_insert_with(DatabaseConfig::default);
    if database.path.as_deref().map(str::trim).unwrap_or("").is_empty() {
        database.path = Some(config_dir.join(DEFAULT_DB_FILE).to_string_lossy().into_owned());
    }
    config
}

fn apply_logging_defaults(mut config: EngineConfig) -> EngineConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.json.is_none() {
        logging.json = Some(false);
    }
    config
}

fn apply_scheduler_defaults(mut config: EngineConfig) -> EngineConfig {
    let scheduler = config.scheduler.get_or_insert_with(SchedulerConfig::default);
    if scheduler.tick_millis.is_none() {
        scheduler.tick_millis = Some(DEFAULT_TICK_MILLIS);
    }
    if scheduler.reconcile_secs.is_none() {
        scheduler.reconcile_secs = Some(DEFAULT_RECONCILE_SECS);
    }
    config
}

/// `shell_timeout_secs` stays unset: shell commands are unbounded by default.
fn apply_executor_defaults(mut config: EngineConfig) -> EngineConfig {
    let executor = config.executor.get_or_insert_with(ExecutorConfig::default);
    if executor.http_timeout_secs.is_none() {
        executor.http_timeout_secs = Some(DEFAULT_HTTP_TIMEOUT_SECS);
    }
    config
}

fn apply_notify_defaults(mut config: EngineConfig) -> EngineConfig {
    let notify = config.notify.get_or_insert_with(NotifyConfig::default);
    if notify.webhook_timeout_secs.is_none() {
        notify.webhook_timeout_secs = Some(DEFAULT_WEBHOOK_TIMEOUT_SECS);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn fills_every_section() {
        let config = apply_all_defaults(EngineConfig::default(), Path::new("/etc/cronpilot"));
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/etc/cronpilot/cronpilot.db"))
        );
        assert_eq!(config.scheduler.as_ref().unwrap().tick_millis, Some(1000));
        assert_eq!(config.scheduler.as_ref().unwrap().reconcile_secs, Some(30));
        assert_eq!(config.executor.as_ref().unwrap().http_timeout_secs, Some(30));
        assert_eq!(config.executor.as_ref().unwrap().shell_timeout_secs, None);
        assert_eq!(config.notify.as_ref().unwrap().webhook_timeout_secs, Some(10));
        assert_eq!(config.logging.as_ref().unwrap().level.as_deref(), Some("info"));
    }

    #[test]
    fn keeps_explicit_values() {
        let mut config = EngineConfig::default();
        config.database = Some(DatabaseConfig {
            path: Some("jobs.db".into()),
        });
        config.scheduler = Some(SchedulerConfig {
            tick_millis: Some(200),
            reconcile_secs: Some(0),
        });
        let config = apply_all_defaults(config, Path::new("/unused"));
        assert_eq!(config.database_path(), Some(PathBuf::from("jobs.db")));
        assert_eq!(config.scheduler.as_ref().unwrap().tick_millis, Some(200));
        assert_eq!(config.reconcile_interval(), None);
    }
}
