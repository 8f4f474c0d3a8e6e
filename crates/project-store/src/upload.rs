//! Floor-plan uploads.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use imdf_common::clock::{Clock, SystemClock};
use imdf_common::config::DEFAULT_MAX_UPLOAD_BYTES;
use imdf_common::error::{ImdfError, ImdfResult};

/// URL prefix under which stored uploads are served.
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

/// Accepted upload types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    Png,
    Jpeg,
    Pdf,
}

impl MediaType {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Detect the type from the file's leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"%PDF-") {
            Some(Self::Pdf)
        } else {
            None
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// File name inside the uploads directory.
    pub filename: String,
    /// Reference to record in project data, e.g. `/uploads/1714557600000-plan.png`.
    pub path: String,
    pub media_type: MediaType,
}

/// Stores uploaded floor plans under one directory.
#[derive(Clone)]
pub struct UploadStore {
    root: PathBuf,
    max_bytes: u64,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for UploadStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadStore")
            .field("root", &self.root)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

impl UploadStore {
    pub fn open(root: impl Into<PathBuf>) -> ImdfResult<Self> {
        Self::with_options(root, DEFAULT_MAX_UPLOAD_BYTES, Arc::new(SystemClock))
    }

    pub fn with_options(
        root: impl Into<PathBuf>,
        max_bytes: u64,
        clock: Arc<dyn Clock>,
    ) -> ImdfResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| ImdfError::storage(&root, e))?;
        Ok(Self {
            root,
            max_bytes,
            clock,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Validate and store an upload.
    ///
    /// The extension and the content must both name the same allowed type.
    pub fn store(&self, original_name: &str, bytes: &[u8]) -> ImdfResult<StoredUpload> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(ImdfError::invalid_input(format!(
                "file is {} bytes, limit is {}",
                bytes.len(),
                self.max_bytes
            )));
        }

        let base = sanitize_file_name(original_name);
        let by_extension = Path::new(&base)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(MediaType::from_extension);
        let media_type = match (by_extension, MediaType::sniff(bytes)) {
            (Some(ext), Some(content)) if ext == content => content,
            (Some(ext), Some(content)) => {
                return Err(ImdfError::invalid_input(format!(
                    "{original_name} is named as {ext} but contains {content}"
                )))
            }
            _ => {
                return Err(ImdfError::invalid_input(format!(
                    "{original_name}: only PNG, JPEG, and PDF files are allowed"
                )))
            }
        };

        let filename = format!("{}-{base}", self.clock.now().timestamp_millis());
        let target = self.root.join(&filename);
        std::fs::write(&target, bytes).map_err(|e| ImdfError::storage(&target, e))?;

        tracing::info!(
            file = %filename,
            bytes = bytes.len(),
            media_type = media_type.mime(),
            "Stored upload"
        );

        Ok(StoredUpload {
            path: format!("{UPLOAD_URL_PREFIX}/{filename}"),
            filename,
            media_type,
        })
    }

    /// Store a file from disk under its own file name.
    pub fn store_file(&self, source: &Path) -> ImdfResult<StoredUpload> {
        let metadata = std::fs::metadata(source).map_err(|e| ImdfError::storage(source, e))?;
        if metadata.len() > self.max_bytes {
            return Err(ImdfError::invalid_input(format!(
                "{} is {} bytes, limit is {}",
                source.display(),
                metadata.len(),
                self.max_bytes
            )));
        }
        let bytes = std::fs::read(source).map_err(|e| ImdfError::storage(source, e))?;
        let name = source
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ImdfError::invalid_input(format!("{} has no file name", source.display())))?;
        self.store(name, &bytes)
    }
}

/// Last path component with anything outside `[A-Za-z0-9._-]` replaced
/// by `_`. Never empty and never starts with `.`.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}
