pub mod export;
pub mod list;
pub mod save;
pub mod show;
pub mod upload;
pub mod validate;

use std::path::Path;

use anyhow::Context;

use imdf_common::config::AppConfig;
use imdf_project_store::ProjectStore;

pub(crate) fn open_store(config: &AppConfig) -> anyhow::Result<ProjectStore> {
    ProjectStore::open(&config.projects_dir).with_context(|| {
        format!(
            "Failed to open project store at {}",
            config.projects_dir.display()
        )
    })
}

/// Read a JSON payload file.
pub(crate) fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}
