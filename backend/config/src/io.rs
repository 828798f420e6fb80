//! Config file location and loading.

use crate::schema::EngineConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Overrides the config directory.
pub const CONFIG_DIR_ENV: &str = "CRONPILOT_CONFIG_DIR";

/// Resolve the Cronpilot config directory.
/// Priority: `CRONPILOT_CONFIG_DIR` env > `~/.cronpilot/` > `./.cronpilot`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(".cronpilot"),
        None => PathBuf::from(".cronpilot"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file as a JSON value tree, ready for env substitution.
///
/// A missing file is an empty config (first run).
pub async fn load_config_value(path: &Path) -> Result<serde_json::Value> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(serde_json::Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Option<serde_json::Value> = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    // An empty document parses as null.
    Ok(value.unwrap_or_else(|| serde_json::Value::Object(Default::default())))
}
