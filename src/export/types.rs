//! Export types
//!
//! Outcomes of the log and screenshot exports plus the export error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single file handed back to the user for download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A named entry inside a packaged archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A frame offered for individual retrieval when packaging failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameDownload {
    pub file_name: String,
    /// The frame's image still in its `data:` transport encoding
    pub data_url: String,
}

/// Result of exporting the frame store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum ArchiveOutcome {
    /// Every frame packed into one archive
    #[serde(rename_all = "camelCase")]
    Packaged {
        file_name: String,
        bytes: Vec<u8>,
        entry_count: usize,
    },
    /// Packaging failed; each frame is exposed on its own
    Individual { files: Vec<FrameDownload> },
}

impl ArchiveOutcome {
    /// Number of frames covered by this outcome
    pub fn frame_count(&self) -> usize {
        match self {
            ArchiveOutcome::Packaged { entry_count, .. } => *entry_count,
            ArchiveOutcome::Individual { files } => files.len(),
        }
    }

    pub fn is_packaged(&self) -> bool {
        matches!(self, ArchiveOutcome::Packaged { .. })
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No {0} to export")]
    NothingToExport(String),

    #[error("Packaging error: {0}")]
    Packaging(String),

    #[error("Decoding error: {0}")]
    Decoding(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("All export strategies failed: {}", .0.join("; "))]
    Exhausted(Vec<String>),
}

impl From<ExportError> for String {
    fn from(e: ExportError) -> String {
        e.to_string()
    }
}
