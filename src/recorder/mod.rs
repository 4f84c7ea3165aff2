//! Periodic capture
//!
//! - [`CaptureTimer`] owns the Idle/Running lifecycle
//! - one dispatcher task per session handles ticks, source-ended signals and
//!   stop requests as typed [`CaptureEvent`]s
//! - [`MediaRecorder`] accumulates audio/video chunks into blobs

pub mod events;
pub mod media;
pub mod state;
pub mod timer;

pub use events::{CaptureEvent, CaptureNotice, SourceEndedNotifier};
pub use media::{MediaKind, MediaRecorder};
pub use state::{CaptureSession, CaptureState, SessionSummary, StopReason};
pub use timer::{CaptureTimer, TimerSettings};
