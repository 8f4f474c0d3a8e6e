//! Persisted project records.
//!
//! A project is stored whole as `{id, name, createdAt, updatedAt, data}`.
//! The `data` payload is kept as opaque JSON so records round-trip fields
//! this crate does not model; [`Project::project_data`] gives the typed view.

use serde::{Deserialize, Serialize};

use crate::entity::ProjectData;

/// A stored project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Identifier assigned on first save. Never changes afterwards.
    pub id: String,

    /// Human-readable project name.
    #[serde(default)]
    pub name: String,

    /// First-save timestamp (RFC 3339).
    #[serde(rename = "createdAt")]
    pub created_at: String,

    /// Last-save timestamp (RFC 3339).
    #[serde(rename = "updatedAt")]
    pub updated_at: String,

    /// Entity payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// The listing view of a project: everything except the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "updatedAt")]
    pub updated_at: String,
}

impl Project {
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }

    /// Typed view of the payload.
    pub fn project_data(&self) -> Result<ProjectData, ProjectError> {
        if self.data.is_null() {
            return Ok(ProjectData::default());
        }
        ProjectData::from_value(self.data.clone()).map_err(|source| ProjectError::InvalidData {
            id: self.id.clone(),
            source,
        })
    }
}

/// Errors that can occur when interpreting a stored project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Project {id} has an unreadable payload: {source}")]
    InvalidData {
        id: String,
        source: serde_json::Error,
    },
}
