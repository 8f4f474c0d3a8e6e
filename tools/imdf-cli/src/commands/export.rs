//! Export a project as an IMDF archive.

use std::path::PathBuf;

use anyhow::Context;

use imdf_common::config::AppConfig;
use imdf_export_engine::{write_archive, IMDF_FILES};
use imdf_project_model::entity::ProjectData;

pub fn run(
    config: &AppConfig,
    id: Option<String>,
    data: Option<PathBuf>,
    output: PathBuf,
) -> anyhow::Result<()> {
    let payload = match (id, data) {
        (_, Some(path)) => {
            let value = super::read_json(&path)?;
            ProjectData::from_value(value)
                .with_context(|| format!("{} is not a project payload", path.display()))?
        }
        (Some(id), None) => {
            let store = super::open_store(config)?;
            let project = store
                .load(&id)
                .map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
            println!("Exporting project: {} ({})", project.name, project.id);
            project
                .project_data()
                .map_err(|e| anyhow::anyhow!("{e}"))?
        }
        (None, None) => anyhow::bail!("Either a project id or --data is required"),
    };

    let path = write_archive(&payload, &output)
        .map_err(|e| anyhow::anyhow!("Export failed: {e}"))?;

    println!("Wrote {} ({} entries)", path.display(), IMDF_FILES.len());
    Ok(())
}
