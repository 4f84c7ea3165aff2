//! Writing exports to a directory

use super::types::{ArchiveOutcome, Download, ExportError};
use crate::frames::Frame;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Files written for an archive outcome
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SinkReport {
    pub written: Vec<PathBuf>,
    /// Files that could not be written, with the reason
    pub failed: Vec<String>,
}

pub fn write_download(dir: &Path, download: &Download) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&download.file_name);
    fs::write(&path, &download.bytes)?;
    tracing::debug!("Wrote {} bytes to {:?}", download.bytes.len(), path);
    Ok(path)
}

/// Write a packaged archive as one file, or each individually exposed frame
/// as its own PNG. Per-frame failures are reported, not fatal.
pub fn write_archive_outcome(dir: &Path, outcome: &ArchiveOutcome) -> Result<SinkReport, ExportError> {
    fs::create_dir_all(dir)?;
    let mut report = SinkReport::default();

    match outcome {
        ArchiveOutcome::Packaged {
            file_name, bytes, ..
        } => {
            let path = dir.join(file_name);
            fs::write(&path, bytes)?;
            report.written.push(path);
        }
        ArchiveOutcome::Individual { files } => {
            for file in files {
                let decoded = Frame::decode_data_url(&file.data_url);
                match decoded {
                    Ok(bytes) => {
                        let path = dir.join(&file.file_name);
                        fs::write(&path, bytes)?;
                        report.written.push(path);
                    }
                    Err(e) => {
                        tracing::error!("Could not write {}: {}", file.file_name, e);
                        report.failed.push(format!("{}: {}", file.file_name, e));
                    }
                }
            }
        }
    }

    Ok(report)
}
