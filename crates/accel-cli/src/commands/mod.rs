use std::path::Path;

use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::debug;

use accel_core::GridConfig;

pub mod cost;
pub mod optimize;
pub mod schedule;

pub fn load_config(path: Option<&Path>) -> anyhow::Result<GridConfig> {
    match path {
        Some(path) => {
            let config = GridConfig::from_file(path)?;
            debug!(path = %path.display(), "loaded config");
            Ok(config)
        }
        None => Ok(GridConfig::default()),
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
