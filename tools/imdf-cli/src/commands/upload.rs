//! Store a floor-plan upload.

use std::path::PathBuf;
use std::sync::Arc;

use imdf_common::clock::SystemClock;
use imdf_common::config::AppConfig;
use imdf_project_store::UploadStore;

pub fn run(config: &AppConfig, file: PathBuf, project: Option<String>) -> anyhow::Result<()> {
    let uploads = UploadStore::with_options(
        &config.uploads_dir,
        config.upload.max_bytes,
        Arc::new(SystemClock),
    )
    .map_err(|e| anyhow::anyhow!("Failed to open upload store: {e}"))?;

    let stored = uploads
        .store_file(&file)
        .map_err(|e| anyhow::anyhow!("Upload rejected: {e}"))?;

    println!("Stored {} as {}", stored.media_type, stored.path);

    if let Some(id) = project {
        let store = super::open_store(config)?;
        let record = store
            .load(&id)
            .map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;

        let mut data = record.data;
        if data.is_null() {
            data = serde_json::Value::Object(serde_json::Map::new());
        }
        match data.as_object_mut() {
            Some(map) => {
                map.insert(
                    "floorplanImage".to_string(),
                    serde_json::Value::String(stored.path.clone()),
                );
            }
            None => anyhow::bail!("Project {id} has a non-object payload"),
        }
        store
            .save(Some(&id), &record.name, data)
            .map_err(|e| anyhow::anyhow!("Failed to save project: {e}"))?;
        println!("Set as floor plan of project {id}");
    }

    Ok(())
}
