//! Store a project payload.

use std::path::PathBuf;

use imdf_common::config::AppConfig;
use imdf_project_model::entity::ProjectData;

pub fn run(config: &AppConfig, data: PathBuf, name: String, id: Option<String>) -> anyhow::Result<()> {
    let payload = super::read_json(&data)?;

    // Payloads stay opaque in the store, but one the exporter cannot read
    // is almost certainly a mistake.
    if let Err(e) = ProjectData::from_value(payload.clone()) {
        anyhow::bail!("{} is not a project payload: {e}", data.display());
    }

    let store = super::open_store(config)?;
    let id = store
        .save(id.as_deref(), &name, payload)
        .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;

    println!("{id}");
    Ok(())
}
