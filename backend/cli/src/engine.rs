//! Wiring from a prepared [`EngineConfig`] to live stores and the executor.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use cronpilot_config::EngineConfig;
use cronpilot_executor::{Executor, ExecutorSettings};
use cronpilot_notify::Notifier;
use cronpilot_scheduler::{SqliteJobStore, SqliteRunLog};

pub struct Engine {
    pub jobs: Arc<SqliteJobStore>,
    pub logs: Arc<SqliteRunLog>,
    pub executor: Arc<Executor>,
}

impl Engine {
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let db_path = config
            .database_path()
            .context("database.path is not set")?;
        ensure_parent_dir(&db_path)?;
        let db = db_path.to_string_lossy();

        let jobs = Arc::new(SqliteJobStore::open(&db)?);
        let logs = Arc::new(SqliteRunLog::open(&db)?);
        let notifier = Notifier::network(config.webhook_timeout())?;
        let executor = Executor::new(
            jobs.clone(),
            logs.clone(),
            notifier,
            ExecutorSettings {
                http_timeout: config.http_timeout(),
                shell_timeout: config.shell_timeout(),
            },
        )?;

        info!(db = %db, "Opened job database");
        Ok(Self {
            jobs,
            logs,
            executor: Arc::new(executor),
        })
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
