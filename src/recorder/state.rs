//! Capture state management
//!
//! Defines the capture state machine and session metadata.

use crate::capture::SourceInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current state of the capture timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureState {
    /// No session active
    #[default]
    Idle,
    /// Ticking and sampling the source
    Running,
}

/// Why a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    /// `stop()` was called, or a new session replaced this one
    Requested,
    /// The source signalled it had ended
    SourceEnded,
}

/// Metadata for one capture session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub source: SourceInfo,
    pub period_ms: u64,
}

/// Result of a finished session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session: CaptureSession,
    /// Timer firings handled
    pub ticks: u64,
    /// Frames appended to the store
    pub captured: u64,
    /// Ticks where no frame could be taken
    pub skipped: u64,
    pub reason: StopReason,
    pub stopped_at: DateTime<Utc>,
}
