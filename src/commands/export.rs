//! Export commands

use super::AppState;
use crate::event_log::kind;
use crate::export::delimited::{CSV_MIME, LOG_FILE_NAME};
use crate::export::{
    to_archive, to_delimited_text, write_archive_outcome, write_download, ArchiveOutcome,
    Download, ExportError, SinkReport,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Files written by [`save_exports`]
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub log_file: Option<PathBuf>,
    pub screenshots: Option<SinkReport>,
}

fn build_log_csv(state: &AppState) -> Result<Download, ExportError> {
    let log = state.log.lock();
    if log.is_empty() {
        return Err(ExportError::NothingToExport("log records".to_string()));
    }
    Ok(Download {
        file_name: LOG_FILE_NAME.to_string(),
        mime: CSV_MIME.to_string(),
        bytes: to_delimited_text(&log).into_bytes(),
    })
}

fn build_archive(state: &AppState) -> Result<ArchiveOutcome, ExportError> {
    let now = state.clock.now();
    let outcome = to_archive(&state.frames.lock(), state.packager(), now)?;

    let message = match &outcome {
        ArchiveOutcome::Packaged { .. } => format!(
            "exported {} screenshots to {} file",
            outcome.frame_count(),
            state.packager().extension().to_uppercase()
        ),
        ArchiveOutcome::Individual { files } => {
            format!("exported {} screenshots (individual downloads)", files.len())
        }
    };
    state.log_event(kind::SYSTEM, message);
    Ok(outcome)
}

/// The event log as a BOM-prefixed CSV download
pub fn export_log_csv(state: &AppState) -> Result<Download, String> {
    build_log_csv(state).map_err(String::from)
}

/// Every captured frame, packaged or exposed individually
pub fn export_screenshots(state: &AppState) -> Result<ArchiveOutcome, String> {
    build_archive(state).map_err(String::from)
}

/// Write the CSV and the screenshot export into `dir` (the configured
/// output directory when `None`). An empty log or frame store is skipped;
/// only when both are empty is it an error.
pub fn save_exports(state: &AppState, dir: Option<&Path>) -> Result<ExportReport, String> {
    let dir = dir.unwrap_or(&state.config.export.output_dir);
    let mut report = ExportReport::default();

    // built before the screenshot export appends its own record
    let csv = build_log_csv(state);

    match build_archive(state) {
        Ok(outcome) => {
            report.screenshots = Some(write_archive_outcome(dir, &outcome).map_err(String::from)?);
        }
        Err(ExportError::NothingToExport(what)) => {
            tracing::info!("Skipping screenshot export: no {}", what);
        }
        Err(e) => return Err(e.into()),
    }

    match csv {
        Ok(download) => {
            report.log_file = Some(write_download(dir, &download).map_err(String::from)?);
        }
        Err(ExportError::NothingToExport(what)) => {
            tracing::info!("Skipping log export: no {}", what);
        }
        Err(e) => return Err(e.into()),
    }

    if report.log_file.is_none() && report.screenshots.is_none() {
        return Err(String::from(ExportError::NothingToExport("data".to_string())));
    }

    tracing::info!("Exports saved to {:?}", dir);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Resolution, SyntheticSource};
    use crate::export::delimited::BOM;

    fn capture_frames(state: &AppState, count: usize) {
        let mut source = SyntheticSource::new(16, 16);
        let mut frames = state.frames.lock();
        for _ in 0..count {
            frames
                .capture(&mut source, Resolution::new(8, 8), state.clock.now())
                .unwrap();
        }
    }

    #[test]
    fn test_empty_exports_are_misuse() {
        let state = AppState::default();
        assert_eq!(export_log_csv(&state).unwrap_err(), "No log records to export");
        assert_eq!(export_screenshots(&state).unwrap_err(), "No screenshots to export");
        assert!(state.log.lock().is_empty());
    }

    #[test]
    fn test_export_log_csv() {
        let state = AppState::default();
        state.log_event(kind::SYSTEM, "a, b");

        let download = export_log_csv(&state).unwrap();
        assert_eq!(download.file_name, "info_capture_log.csv");
        let text = String::from_utf8(download.bytes).unwrap();
        assert!(text.starts_with(BOM));
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with(",system,a  b\n"));
    }

    #[test]
    fn test_export_screenshots_logs_summary() {
        let state = AppState::default();
        capture_frames(&state, 3);

        let outcome = export_screenshots(&state).unwrap();
        assert!(outcome.is_packaged());
        assert_eq!(outcome.frame_count(), 3);

        let log = state.log.lock();
        assert_eq!(log.records()[0].content, "exported 3 screenshots to ZIP file");
    }

    #[test]
    fn test_save_exports() {
        let state = AppState::default();
        let dir = tempfile::tempdir().unwrap();
        assert!(save_exports(&state, Some(dir.path())).is_err());

        state.log_event(kind::SYSTEM, "ready");
        capture_frames(&state, 2);

        let report = save_exports(&state, Some(dir.path())).unwrap();
        let log_file = report.log_file.unwrap();
        assert!(log_file.ends_with("info_capture_log.csv"));
        let csv = std::fs::read_to_string(&log_file).unwrap();
        assert_eq!(csv.lines().count(), 2);

        let screenshots = report.screenshots.unwrap();
        assert_eq!(screenshots.written.len(), 1);
        assert!(screenshots.failed.is_empty());
        assert!(screenshots.written[0].extension().unwrap() == "zip");
    }
}
