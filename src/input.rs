//! User input tracking
//!
//! Text submissions, keystrokes in the input field and the last known
//! pointer position.

use crate::event_log::{kind, SharedEventLog};
use crate::utils::Clock;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Record produced for each submitted input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputSubmission {
    pub timestamp: DateTime<Utc>,
    pub user_input: String,
    pub mouse_position: String,
    pub data_records_count: usize,
    pub session_id: String,
}

pub struct InputTracker {
    log: SharedEventLog,
    clock: Arc<dyn Clock>,
    pointer: Mutex<String>,
}

impl InputTracker {
    pub fn new(log: SharedEventLog, clock: Arc<dyn Clock>) -> Self {
        Self {
            log,
            clock,
            pointer: Mutex::new(format_pointer(0, 0)),
        }
    }

    pub fn update_pointer(&self, x: i32, y: i32) {
        *self.pointer.lock() = format_pointer(x, y);
    }

    pub fn pointer(&self) -> String {
        self.pointer.lock().clone()
    }

    pub fn record_input_key(&self, key: &str) {
        self.log.lock().append(kind::KEYBOARD, format!("input key: {}", key));
    }

    /// Log a submission. Blank input is ignored.
    ///
    /// `dataRecordsCount` is the log size before the submission record.
    pub fn submit_input(&self, text: &str) -> Option<InputSubmission> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let now = self.clock.now();
        let mouse_position = self.pointer();
        let mut log = self.log.lock();
        let submission = InputSubmission {
            timestamp: now,
            user_input: text.to_string(),
            mouse_position,
            data_records_count: log.len(),
            session_id: now.timestamp_millis().to_string(),
        };
        log.append(kind::USER_INPUT, format!("submitted: {}", text));

        tracing::debug!("Input submitted ({} chars)", text.len());
        Some(submission)
    }
}

fn format_pointer(x: i32, y: i32) -> String {
    format!("x: {} y: {}", x, y)
}
