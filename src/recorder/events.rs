//! Typed capture events
//!
//! Ticks, source-ended signals and stop requests all reach a session's
//! dispatcher as [`CaptureEvent`]s, so they are handled one at a time in
//! arrival order.

use super::state::StopReason;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Input to a session dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    /// The fixed-period timer fired
    Tick,
    /// The source ended on its own
    SourceEnded,
    /// The owner asked the session to stop
    Stop,
}

/// Notifications broadcast to observers of the capture timer
#[derive(Debug, Clone)]
pub enum CaptureNotice {
    Started { session_id: Uuid },
    FrameCaptured { session_id: Uuid, total_frames: usize },
    Stopped { session_id: Uuid, reason: StopReason },
}

/// Handed to a [`crate::capture::FrameSource`] so it can end the session it
/// belongs to
#[derive(Debug, Clone)]
pub struct SourceEndedNotifier {
    session_id: Uuid,
    tx: mpsc::UnboundedSender<CaptureEvent>,
}

impl SourceEndedNotifier {
    pub(crate) fn new(session_id: Uuid, tx: mpsc::UnboundedSender<CaptureEvent>) -> Self {
        Self { session_id, tx }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Signal that the source has ended. Does nothing if the session is gone.
    pub fn notify(&self) {
        if self.tx.send(CaptureEvent::SourceEnded).is_err() {
            tracing::trace!("Source ended after session {} finished", self.session_id);
        }
    }
}
