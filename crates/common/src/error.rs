//! Error types shared across IMDF Builder crates.

use std::fmt;
use std::path::PathBuf;

/// Top-level error type for IMDF Builder operations.
#[derive(Debug, thiserror::Error)]
pub enum ImdfError {
    /// Malformed or oversized project identifier. Raised before any storage
    /// location is addressed.
    #[error("Invalid project identifier: {message}")]
    InvalidIdentifier { message: String },

    #[error("Project not found: {id}")]
    NotFound { id: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Serialization failed for {target}: {source}")]
    Serialization {
        target: String,
        source: serde_json::Error,
    },

    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Result type alias using ImdfError.
pub type ImdfResult<T> = Result<T, ImdfError>;

/// Coarse classification of an [`ImdfError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidIdentifier,
    NotFound,
    InvalidInput,
    SerializationFailure,
    StorageFailure,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidIdentifier => "invalid_identifier",
            Self::NotFound => "not_found",
            Self::InvalidInput => "invalid_input",
            Self::SerializationFailure => "serialization_failure",
            Self::StorageFailure => "storage_failure",
            Self::Config => "config",
        };
        f.write_str(label)
    }
}

impl ImdfError {
    pub fn invalid_identifier(msg: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            message: msg.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    pub fn serialization(target: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            target: target.into(),
            source,
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// The error's kind. Archive failures are write failures of the export
    /// target and classify as storage failures.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentifier { .. } => ErrorKind::InvalidIdentifier,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Serialization { .. } => ErrorKind::SerializationFailure,
            Self::Storage { .. } | Self::Archive { .. } => ErrorKind::StorageFailure,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}
