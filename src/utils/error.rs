//! Error types and handling
//!
//! Common error types used across the application.

use crate::capture::CaptureError;
use crate::export::ExportError;
use crate::media::MediaError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),
}

/// Error response for frontend
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        let code = match &error {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Capture(_) => "CAPTURE_ERROR",
            AppError::Media(_) => "MEDIA_ERROR",
            AppError::Export(ExportError::NothingToExport(_)) => "NOTHING_TO_EXPORT",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::PermissionDenied(_) => "PERMISSION_DENIED",
        };

        ErrorResponse {
            code: code.to_string(),
            message: error.to_string(),
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_codes() {
        let response: ErrorResponse = AppError::Config("interval must be positive".into()).into();
        assert_eq!(response.code, "CONFIG_ERROR");
        assert!(response.message.contains("interval must be positive"));

        let response: ErrorResponse =
            AppError::Export(ExportError::NothingToExport("screenshots".into())).into();
        assert_eq!(response.code, "NOTHING_TO_EXPORT");
    }
}
