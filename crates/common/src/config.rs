//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ImdfError, ImdfResult};

/// Divisor applied to drawing-surface units to produce exported coordinates.
pub const DEFAULT_SCALE_FACTOR: f64 = 100_000.0;

/// Default upload ceiling: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where project records are stored.
    pub projects_dir: PathBuf,

    /// Directory where uploaded floor plans are stored.
    pub uploads_dir: PathBuf,

    /// Screen-unit divisor used when normalizing drawn geometry.
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,

    /// Upload limits.
    #[serde(default)]
    pub upload: UploadConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Upload limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Largest accepted floor-plan file in bytes.
    pub max_bytes: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "imdf_project_store=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data = data_dir();
        Self {
            projects_dir: data.join("projects"),
            uploads_dir: data.join("uploads"),
            scale_factor: DEFAULT_SCALE_FACTOR,
            upload: UploadConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

fn default_scale_factor() -> f64 {
    DEFAULT_SCALE_FACTOR
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load_from(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> ImdfResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ImdfError::storage(path, e))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| ImdfError::config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ImdfResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ImdfResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ImdfError::storage(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ImdfError::serialization("config", e))?;
        std::fs::write(path, json).map_err(|e| ImdfError::storage(path, e))
    }

    fn validate(&self) -> ImdfResult<()> {
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(ImdfError::config(format!(
                "scale_factor must be a positive number, got {}",
                self.scale_factor
            )));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"));
    base.join("imdf-builder").join("config.json")
}

/// Default data directory holding projects and uploads.
fn data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"));
    base.join("imdf-builder")
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.scale_factor, 100_000.0);
        assert_eq!(config.upload.max_bytes, 52_428_800);
        assert!(config.projects_dir.ends_with("imdf-builder/projects"));
        assert!(config.uploads_dir.ends_with("imdf-builder/uploads"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.scale_factor = 50_000.0;
        config.logging.level = "debug".to_string();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.scale_factor, 50_000.0);
        assert_eq!(loaded.logging.level, "debug");
    }

    #[test]
    fn test_missing_optional_sections_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"projects_dir": "/srv/p", "uploads_dir": "/srv/u"}"#,
        )
        .unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.projects_dir, PathBuf::from("/srv/p"));
        assert_eq!(loaded.scale_factor, DEFAULT_SCALE_FACTOR);
        assert_eq!(loaded.upload.max_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!loaded.logging.json);
    }

    #[test]
    fn test_rejects_non_positive_scale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"projects_dir": "/p", "uploads_dir": "/u", "scale_factor": 0}"#,
        )
        .unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ImdfError::Config { .. }));
    }
}
