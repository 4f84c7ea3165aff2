//! Input tracking commands

use super::AppState;
use crate::input::InputSubmission;

/// Returns `None` for blank input
pub fn submit_input(state: &AppState, text: &str) -> Result<Option<InputSubmission>, String> {
    Ok(state.input.submit_input(text))
}

pub fn record_input_key(state: &AppState, key: &str) -> Result<(), String> {
    state.input.record_input_key(key);
    Ok(())
}

pub fn update_pointer(state: &AppState, x: i32, y: i32) -> Result<(), String> {
    state.input.update_pointer(x, y);
    Ok(())
}

/// Log panel lines, newest first
pub fn get_log_lines(state: &AppState) -> Vec<String> {
    state.log.lock().render_lines()
}
