//! Load CRUD page configs from JSON text or files.

use crate::config::{validate, CrudConfig};
use crate::error::ConfigError;
use std::path::Path;

/// Parse and validate a page config document.
pub fn load_config_from_str(json: &str) -> Result<CrudConfig, ConfigError> {
    let config: CrudConfig = serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

pub async fn load_config_from_path(path: impl AsRef<Path>) -> Result<CrudConfig, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading crud config");
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    load_config_from_str(&text)
}

/// Load every `*.json` page config in a directory, sorted by file name.
pub async fn load_configs_from_dir(dir: impl AsRef<Path>) -> Result<Vec<CrudConfig>, ConfigError> {
    let dir = dir.as_ref();
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", dir.display(), e)))?;
    let mut paths = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ConfigError::Load(e.to_string()))?
    {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        out.push(load_config_from_path(&path).await?);
    }
    Ok(out)
}
