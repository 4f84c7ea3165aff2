//! Screenshot archive export
//!
//! Frames are decoded from their transport encoding and packed into one ZIP.
//! If packaging fails every frame is offered for individual download instead,
//! so no captured data is lost.

use super::fallback::{FallbackChain, Strategy};
use super::types::{ArchiveEntry, ArchiveOutcome, ExportError, FrameDownload};
use crate::frames::{Frame, FrameStore};
use chrono::{DateTime, Local, Utc};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Packs named entries into a single binary
pub trait ArchivePackager: Send + Sync {
    /// File extension of the produced archive, without the dot
    fn extension(&self) -> &'static str;

    fn package(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ExportError>;
}

/// ZIP packager. Entries are stored uncompressed since PNG already is.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZipPackager;

impl ArchivePackager for ZipPackager {
    fn extension(&self) -> &'static str {
        "zip"
    }

    fn package(&self, entries: &[ArchiveEntry]) -> Result<Vec<u8>, ExportError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for entry in entries {
            writer
                .start_file(entry.name.as_str(), options)
                .map_err(|e| ExportError::Packaging(format!("{}: {}", entry.name, e)))?;
            writer.write_all(&entry.bytes)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| ExportError::Packaging(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// `screenshot_<local timestamp>_<000>.png`
pub fn entry_name(frame: &Frame, index: usize) -> String {
    let timestamp = frame
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H-%M-%S");
    format!("screenshot_{}_{:03}.png", timestamp, index)
}

/// Name used when a frame is downloaded on its own
pub fn individual_name(index: usize) -> String {
    format!("screenshot_{:03}.png", index)
}

/// `screenshots_<YYYY-MM-DD>.<ext>` using the UTC date
pub fn archive_file_name(now: DateTime<Utc>, extension: &str) -> String {
    format!("screenshots_{}.{}", now.format("%Y-%m-%d"), extension)
}

struct PackageStrategy<'a> {
    packager: &'a dyn ArchivePackager,
    file_name: String,
}

impl Strategy<[Frame], ArchiveOutcome, ExportError> for PackageStrategy<'_> {
    fn name(&self) -> &'static str {
        "package"
    }

    fn attempt(&self, frames: &[Frame]) -> Result<ArchiveOutcome, ExportError> {
        let entries = frames
            .iter()
            .enumerate()
            .map(|(index, frame)| {
                Ok(ArchiveEntry {
                    name: entry_name(frame, index),
                    bytes: frame.image_bytes()?,
                })
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        let bytes = self.packager.package(&entries)?;
        Ok(ArchiveOutcome::Packaged {
            file_name: self.file_name.clone(),
            bytes,
            entry_count: entries.len(),
        })
    }
}

struct IndividualStrategy;

impl Strategy<[Frame], ArchiveOutcome, ExportError> for IndividualStrategy {
    fn name(&self) -> &'static str {
        "individual"
    }

    fn attempt(&self, frames: &[Frame]) -> Result<ArchiveOutcome, ExportError> {
        let files = frames
            .iter()
            .enumerate()
            .map(|(index, frame)| FrameDownload {
                file_name: individual_name(index),
                data_url: frame.image_data.clone(),
            })
            .collect();
        Ok(ArchiveOutcome::Individual { files })
    }
}

/// Export every captured frame.
///
/// An empty store is reported as [`ExportError::NothingToExport`] without
/// invoking the packager.
pub fn to_archive(
    store: &FrameStore,
    packager: &dyn ArchivePackager,
    now: DateTime<Utc>,
) -> Result<ArchiveOutcome, ExportError> {
    if store.is_empty() {
        return Err(ExportError::NothingToExport("screenshots".to_string()));
    }

    let chain = FallbackChain::new()
        .then(PackageStrategy {
            packager,
            file_name: archive_file_name(now, packager.extension()),
        })
        .then(IndividualStrategy);

    match chain.run(store.frames()) {
        Ok(attempted) => {
            if !attempted.is_primary() {
                tracing::warn!(
                    "Archive packaging failed, exposing {} frames individually",
                    store.count()
                );
            }
            tracing::info!(
                "Exported {} frames via '{}'",
                attempted.value.frame_count(),
                attempted.strategy
            );
            Ok(attempted.value)
        }
        Err(failures) => Err(ExportError::Exhausted(
            failures.iter().map(ToString::to_string).collect(),
        )),
    }
}
