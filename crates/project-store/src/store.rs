//! File-backed project records.
//!
//! Each project is one pretty-printed `{id}.json` file under the store
//! root. Writes replace the whole record; concurrent writers to the same id
//! race and the last one wins.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use imdf_common::clock::{Clock, SystemClock};
use imdf_common::error::{ErrorKind, ImdfError, ImdfResult};
use imdf_project_model::entity::ProjectData;
use imdf_project_model::project::{Project, ProjectSummary};

use crate::id::ProjectId;

const RECORD_EXTENSION: &str = "json";

/// Project persistence rooted at one directory.
#[derive(Clone)]
pub struct ProjectStore {
    root: PathBuf,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ProjectStore {
    /// Open a store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> ImdfResult<Self> {
        Self::with_clock(root, Arc::new(SystemClock))
    }

    pub fn with_clock(root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> ImdfResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| ImdfError::storage(&root, e))?;
        Ok(Self { root, clock })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create or overwrite a record and return the id used.
    ///
    /// With `id` set, the record at that id is replaced and its `createdAt`
    /// kept. Without one, a fresh id is generated.
    pub fn save(
        &self,
        id: Option<&str>,
        name: &str,
        data: serde_json::Value,
    ) -> ImdfResult<ProjectId> {
        let id = match id {
            Some(raw) => ProjectId::parse(raw)?,
            None => ProjectId::generate(),
        };
        let path = self.record_path(&id)?;
        let now = self.clock.timestamp();

        let created_at = match read_record(&path) {
            Ok(Some(existing)) => existing.created_at,
            Ok(None) => now.clone(),
            Err(err) if err.kind() == ErrorKind::SerializationFailure => {
                tracing::warn!(id = %id, error = %err, "Overwriting corrupt project record");
                now.clone()
            }
            Err(err) => return Err(err),
        };

        let project = Project {
            id: id.to_string(),
            name: name.to_string(),
            created_at,
            updated_at: now,
            data,
        };

        let json = serde_json::to_string_pretty(&project)
            .map_err(|e| ImdfError::serialization(path.display().to_string(), e))?;
        std::fs::write(&path, json).map_err(|e| ImdfError::storage(&path, e))?;

        tracing::info!(id = %id, name, "Saved project");
        Ok(id)
    }

    /// Save a typed payload.
    pub fn save_data(
        &self,
        id: Option<&str>,
        name: &str,
        data: &ProjectData,
    ) -> ImdfResult<ProjectId> {
        let value = serde_json::to_value(data)
            .map_err(|e| ImdfError::serialization("project data", e))?;
        self.save(id, name, value)
    }

    /// Read a whole record.
    pub fn load(&self, id: &str) -> ImdfResult<Project> {
        let id = ProjectId::parse(id)?;
        let path = self.record_path(&id)?;
        read_record(&path)?.ok_or_else(|| ImdfError::not_found(id.as_str()))
    }

    /// Summaries of every readable record, most recently updated first.
    pub fn list(&self) -> ImdfResult<Vec<ProjectSummary>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| ImdfError::storage(&self.root, e))?;

        let mut summaries = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| ImdfError::storage(&self.root, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            match read_summary(&path) {
                Ok(summary) => summaries.push(summary),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Skipping unreadable project record");
                }
            }
        }

        // RFC 3339 with a fixed format sorts lexically.
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        tracing::debug!(count = summaries.len(), "Listed projects");
        Ok(summaries)
    }

    /// Whether a record exists at `id`.
    pub fn exists(&self, id: &str) -> ImdfResult<bool> {
        let id = ProjectId::parse(id)?;
        Ok(self.record_path(&id)?.is_file())
    }

    fn record_path(&self, id: &ProjectId) -> ImdfResult<PathBuf> {
        let path = self.root.join(format!("{id}.{RECORD_EXTENSION}"));
        if path.parent() != Some(self.root.as_path()) {
            return Err(ImdfError::invalid_identifier(format!(
                "{id} resolves outside the projects directory"
            )));
        }
        Ok(path)
    }
}

/// `Ok(None)` when no file exists at `path`.
fn read_record(path: &Path) -> ImdfResult<Option<Project>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ImdfError::storage(path, e)),
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| ImdfError::serialization(path.display().to_string(), e))
}

fn read_summary(path: &Path) -> ImdfResult<ProjectSummary> {
    let text = std::fs::read_to_string(path).map_err(|e| ImdfError::storage(path, e))?;
    serde_json::from_str(&text).map_err(|e| ImdfError::serialization(path.display().to_string(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdf_common::clock::FixedClock;
    use serde_json::json;

    fn store_at(dir: &Path, at: &str) -> ProjectStore {
        ProjectStore::with_clock(dir, Arc::new(FixedClock::parse(at).unwrap())).unwrap()
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(dir.path(), "2024-05-01T10:00:00Z");

        let data = json!({"levels": [{"id": "L1"}], "extra": {"kept": true}});
        let id = store.save(Some("hq"), "HQ", data.clone()).unwrap();
        assert_eq!(id.as_str(), "hq");

        let project = store.load("hq").unwrap();
        assert_eq!(project.id, "hq");
        assert_eq!(project.name, "HQ");
        assert_eq!(project.data, data);
        assert_eq!(project.created_at, "2024-05-01T10:00:00.000Z");
        assert_eq!(project.updated_at, project.created_at);
        assert!(dir.path().join("hq.json").is_file());
    }

    #[test]
    fn test_overwrite_keeps_created_at() {
        let dir = tempfile::tempdir().unwrap();
        store_at(dir.path(), "2024-05-01T10:00:00Z")
            .save(Some("hq"), "HQ", json!({}))
            .unwrap();
        store_at(dir.path(), "2024-05-03T09:30:00Z")
            .save(Some("hq"), "HQ v2", json!({"units": []}))
            .unwrap();

        let project = store_at(dir.path(), "2024-06-01T00:00:00Z").load("hq").unwrap();
        assert_eq!(project.name, "HQ v2");
        assert_eq!(project.created_at, "2024-05-01T10:00:00.000Z");
        assert_eq!(project.updated_at, "2024-05-03T09:30:00.000Z");
        assert_eq!(project.data, json!({"units": []}));
    }

    #[test]
    fn test_save_without_id_generates_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::open(dir.path()).unwrap();
        let a = store.save(None, "A", json!({})).unwrap();
        let b = store.save(None, "A", json!({})).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_ids_never_touch_storage() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::open(dir.path().join("projects")).unwrap();

        for id in ["../escape", "a/b", "", "x.json"] {
            let err = store.save(Some(id), "bad", json!({})).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
            let err = store.load(id).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
        }
        assert!(!dir.path().join("escape.json").exists());
        assert_eq!(std::fs::read_dir(store.root()).unwrap().count(), 0);
    }

    #[test]
    fn test_load_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::open(dir.path()).unwrap();
        let err = store.load("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!store.exists("nope").unwrap());
    }

    #[test]
    fn test_load_corrupt_is_serialization_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        let store = ProjectStore::open(dir.path()).unwrap();
        let err = store.load("broken").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SerializationFailure);
    }

    #[test]
    fn test_overwrite_corrupt_record_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        store_at(dir.path(), "2024-05-03T09:30:00Z")
            .save(Some("broken"), "Fixed", json!({}))
            .unwrap();

        let project = ProjectStore::open(dir.path()).unwrap().load("broken").unwrap();
        assert_eq!(project.name, "Fixed");
        assert_eq!(project.created_at, "2024-05-03T09:30:00.000Z");
        assert_eq!(project.updated_at, project.created_at);
    }

    #[test]
    fn test_save_surfaces_unreadable_record() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the record should be cannot be read as a file.
        std::fs::create_dir(dir.path().join("blocked.json")).unwrap();
        let store = store_at(dir.path(), "2024-05-01T10:00:00Z");

        let err = store.save(Some("blocked"), "Blocked", json!({})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(dir.path().join("blocked.json").is_dir());
    }

    #[test]
    fn test_list_orders_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        store_at(dir.path(), "2024-05-01T10:00:00Z")
            .save(Some("old"), "Old", json!({"levels": []}))
            .unwrap();
        store_at(dir.path(), "2024-05-02T10:00:00Z")
            .save(Some("new"), "New", json!({}))
            .unwrap();
        std::fs::write(dir.path().join("broken.json"), "[]").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let summaries = ProjectStore::open(dir.path()).unwrap().list().unwrap();
        let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(summaries[1].name, "Old");
    }

    #[test]
    fn test_save_typed_data() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProjectStore::open(dir.path()).unwrap();
        let data = ProjectData::from_value(json!({"levels": [{"id": "L1", "ordinal": 1}]})).unwrap();
        let id = store.save_data(None, "Typed", &data).unwrap();
        let loaded = store.load(id.as_str()).unwrap();
        assert_eq!(loaded.project_data().unwrap(), data);
    }
}
