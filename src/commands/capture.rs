//! Screen capture commands

use super::AppState;
use crate::capture::FrameSource;
use crate::recorder::{CaptureSession, CaptureState, SessionSummary};

/// Start sampling `source`, or stop the running session
pub async fn toggle_screen_capture(
    state: &AppState,
    source: Box<dyn FrameSource>,
) -> Result<CaptureState, String> {
    let mut timer = state.capture.lock().await;
    Ok(timer.toggle(source).await)
}

pub async fn start_screen_capture(
    state: &AppState,
    source: Box<dyn FrameSource>,
) -> Result<CaptureSession, String> {
    let mut timer = state.capture.lock().await;
    Ok(timer.start(source).await)
}

/// Stopping while idle is not an error; it returns `None`
pub async fn stop_screen_capture(state: &AppState) -> Result<Option<SessionSummary>, String> {
    let mut timer = state.capture.lock().await;
    Ok(timer.stop().await)
}

pub async fn get_capture_state(state: &AppState) -> Result<CaptureState, String> {
    Ok(state.capture.lock().await.state())
}

pub fn get_frame_count(state: &AppState) -> usize {
    state.frames.lock().count()
}

/// Drop every captured frame. Refused while a session is running.
pub async fn clear_frames(state: &AppState) -> Result<usize, String> {
    let timer = state.capture.lock().await;
    if timer.is_running() {
        return Err("Stop screen capture before clearing screenshots".to_string());
    }
    let mut frames = state.frames.lock();
    let cleared = frames.count();
    frames.clear();
    tracing::info!("Cleared {} frames", cleared);
    Ok(cleared)
}
