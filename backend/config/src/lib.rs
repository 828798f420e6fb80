//! `cronpilot-config`: engine configuration management.
//!
//! Provides:
//! - Typed config schema (database, logging, scheduler, executor, notify)
//! - YAML loading with `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with errors and warnings

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use schema::EngineConfig;
pub use io::{config_dir, config_file_path, load_config_value};
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use defaults::apply_all_defaults;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use std::path::Path;

/// Overrides `database.path`.
pub const DB_PATH_ENV: &str = "CRONPILOT_DB";

/// Load a config file, substitute env vars, and apply defaults.
///
/// `config_dir` anchors the default database location. This is the main
/// entry point for loading a config at runtime; follow it with [`check`]
/// once logging is up.
pub async fn load_and_prepare(path: &Path, config_dir: &Path) -> Result<EngineConfig> {
    let value = load_config_value(path).await?;

    // Substitute ${VAR} env vars.
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    // Deserialize to typed config.
    let mut config: EngineConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    if let Ok(db) = std::env::var(DB_PATH_ENV) {
        if !db.trim().is_empty() {
            config.database.get_or_insert_with(Default::default).path = Some(db);
        }
    }

    Ok(apply_all_defaults(config, config_dir))
}

/// Validate, log every finding, and fail if any finding is an error.
pub fn check(config: &EngineConfig) -> Result<()> {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("{} ({} config error(s))", first, report.errors.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn prepares_file_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "scheduler:\n  tick_millis: 500\n").unwrap();

        let config = load_and_prepare(&path, dir.path()).await.unwrap();
        assert_eq!(config.tick(), Duration::from_millis(500));
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert!(config.database_path().is_some());
        check(&config).unwrap();
    }

    #[tokio::test]
    async fn mistyped_value_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(dir.path());
        std::fs::write(&path, "scheduler:\n  tick_millis: soon\n").unwrap();
        assert!(load_and_prepare(&path, dir.path()).await.is_err());
    }

    #[test]
    fn check_fails_on_errors() {
        let config = EngineConfig {
            notify: Some(schema::NotifyConfig {
                webhook_timeout_secs: Some(0),
            }),
            ..Default::default()
        };
        let err = check(&config).unwrap_err();
        assert!(err.to_string().contains("notify.webhook_timeout_secs"));
    }
}
