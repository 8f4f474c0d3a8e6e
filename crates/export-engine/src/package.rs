//! Archive packaging.
//!
//! Every document is serialized before the archive is opened, so a
//! serialization failure never leaves a partial archive behind.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use imdf_common::clock::{Clock, SystemClock};
use imdf_common::error::{ImdfError, ImdfResult};
use imdf_project_model::entity::ProjectData;

use crate::assembler::assemble_with;
use crate::feature::ImdfDataset;

/// Suggested file name for a downloaded archive.
pub const ARCHIVE_FILE_NAME: &str = "imdf-export.zip";

/// Deflate level used for every entry.
pub const COMPRESSION_LEVEL: i64 = 9;

/// Assemble and package with the wall clock.
pub fn package(data: &ProjectData) -> ImdfResult<Vec<u8>> {
    package_with(data, &SystemClock)
}

/// Assemble and package, stamping the manifest from `clock`.
pub fn package_with(data: &ProjectData, clock: &dyn Clock) -> ImdfResult<Vec<u8>> {
    package_dataset(&assemble_with(data, clock))
}

/// Serialize every document as pretty JSON and zip them in dataset order.
pub fn package_dataset(dataset: &ImdfDataset) -> ImdfResult<Vec<u8>> {
    let entries = dataset
        .iter()
        .map(|(name, doc)| {
            serde_json::to_string_pretty(doc)
                .map(|text| (name, text))
                .map_err(|e| ImdfError::serialization(name, e))
        })
        .collect::<ImdfResult<Vec<_>>>()?;

    // Fixed entry timestamps keep archives of equal input byte-identical.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(COMPRESSION_LEVEL))
        .last_modified_time(zip::DateTime::default());

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, text) in &entries {
        writer
            .start_file(*name, options)
            .map_err(|e| ImdfError::archive(format!("{name}: {e}")))?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| ImdfError::archive(format!("{name}: {e}")))?;
    }
    let bytes = writer
        .finish()
        .map_err(|e| ImdfError::archive(e.to_string()))?
        .into_inner();

    tracing::debug!(
        entries = entries.len(),
        bytes = bytes.len(),
        "Packaged IMDF archive"
    );
    Ok(bytes)
}

/// Package `data` and write the archive to `path`, creating parent
/// directories as needed.
pub fn write_archive(data: &ProjectData, path: &Path) -> ImdfResult<PathBuf> {
    write_archive_with(data, path, &SystemClock)
}

pub fn write_archive_with(data: &ProjectData, path: &Path, clock: &dyn Clock) -> ImdfResult<PathBuf> {
    tracing::info!(output = %path.display(), "Starting IMDF export");

    let bytes = package_with(data, clock)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ImdfError::storage(parent, e))?;
    }
    std::fs::write(path, &bytes).map_err(|e| ImdfError::storage(path, e))?;

    tracing::info!(output = %path.display(), bytes = bytes.len(), "Exported IMDF archive");
    Ok(path.to_path_buf())
}
