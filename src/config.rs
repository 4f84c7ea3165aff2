//! Application configuration
//!
//! Loaded from a JSON file named by `INFO_CAPTURE_CONFIG`; every field has a
//! default so partial files are fine.

use crate::capture::Resolution;
use crate::recorder::media::{VIDEO_MIME_VP9, VIDEO_MIME_WEBM};
use crate::recorder::timer::{DEFAULT_DOWNSCALE, DEFAULT_PERIOD};
use crate::recorder::TimerSettings;
use crate::utils::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV: &str = "INFO_CAPTURE_CONFIG";
pub const DEFAULT_LOG_FILTER: &str = "info_capture=debug";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureConfig {
    pub interval_ms: u64,
    pub downscale: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_PERIOD.as_millis() as u64,
            downscale: DEFAULT_DOWNSCALE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordingConfig {
    pub video_bits_per_second: u32,
    pub camera_width: u32,
    pub camera_height: u32,
    /// Video MIME types the host recorder accepts
    pub supported_video_mimes: Vec<String>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            video_bits_per_second: 2_500_000,
            camera_width: 1280,
            camera_height: 720,
            supported_video_mimes: vec![VIDEO_MIME_VP9.to_string(), VIDEO_MIME_WEBM.to_string()],
        }
    }
}

impl RecordingConfig {
    /// Resolution requested from camera devices
    pub fn camera_resolution(&self) -> Resolution {
        Resolution::new(self.camera_width, self.camera_height)
    }

    pub fn supports(&self, mime: &str) -> bool {
        self.supported_video_mimes.iter().any(|m| m == mime)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("exports"),
        }
    }
}

// =============================================================================
// Root
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub recording: RecordingConfig,
    pub export: ExportConfig,
    /// Used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capture: CaptureConfig::default(),
            recording: RecordingConfig::default(),
            export: ExportConfig::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load from the file named by `INFO_CAPTURE_CONFIG`, or use defaults
    pub fn from_env() -> AppResult<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.capture.interval_ms == 0 {
            return Err(AppError::Config("capture interval must be positive".into()));
        }
        if self.capture.downscale == 0 {
            return Err(AppError::Config("downscale factor must be at least 1".into()));
        }
        Ok(())
    }

    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            period: Duration::from_millis(self.capture.interval_ms),
            downscale: self.capture.downscale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timer_settings(), TimerSettings::default());
        assert!(config.recording.supports(VIDEO_MIME_VP9));
        assert_eq!(config.log_filter, "info_capture=debug");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"capture": {{"intervalMs": 250}}, "export": {{"outputDir": "/tmp/out"}}}}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.capture.interval_ms, 250);
        assert_eq!(config.capture.downscale, 2);
        assert_eq!(config.export.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.recording.camera_resolution(), Resolution::new(1280, 720));
        assert_eq!(config.timer_settings().period, Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"capture": {{"intervalMs": 0}}}}"#).unwrap();
        assert!(matches!(AppConfig::load(file.path()), Err(AppError::Config(_))));

        let config = AppConfig {
            capture: CaptureConfig {
                interval_ms: 1000,
                downscale: 0,
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(AppConfig::load(file.path()), Err(AppError::Serialization(_))));
    }
}
