//! Append-only event log
//!
//! Every UI action and capture tick leaves a [`LogRecord`] here. Records are
//! never mutated or removed; the log lives for the whole session and is
//! exported as delimited text.

use crate::export::delimited;
use crate::utils::Clock;
use chrono::{DateTime, Local, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Category labels used by the built-in event sources
pub mod kind {
    pub const SYSTEM: &str = "system";
    pub const IMAGE_CAPTURE: &str = "image-capture-event";
    pub const USER_INPUT: &str = "user-input";
    pub const KEYBOARD: &str = "keyboard";
    pub const AUDIO: &str = "audio";
    pub const VIDEO: &str = "video";
}

/// Log shared between the capture dispatcher and the command surface
pub type SharedEventLog = Arc<Mutex<EventLog>>;

/// A single timestamped log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

impl LogRecord {
    /// ISO-8601 with millisecond precision and a `Z` suffix
    pub fn iso_time(&self) -> String {
        self.time.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Display line as shown in the log panel
    pub fn display_line(&self) -> String {
        let local = self.time.with_timezone(&Local);
        format!(
            "[{}] [{}] {}",
            local.format("%Y/%m/%d %H:%M:%S"),
            self.kind,
            self.content
        )
    }
}

pub struct EventLog {
    records: Vec<LogRecord>,
    clock: Arc<dyn Clock>,
}

impl EventLog {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: Vec::new(),
            clock,
        }
    }

    pub fn shared(clock: Arc<dyn Clock>) -> SharedEventLog {
        Arc::new(Mutex::new(Self::new(clock)))
    }

    /// Append a record stamped with the current time and return it for display
    pub fn append(&mut self, kind: &str, content: impl Into<String>) -> LogRecord {
        let record = LogRecord {
            time: self.clock.now(),
            kind: kind.to_string(),
            content: content.into(),
        };
        tracing::debug!(kind = %record.kind, content = %record.content, "event logged");
        self.records.push(record.clone());
        record
    }

    /// Records in insertion order
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display lines, newest first
    pub fn render_lines(&self) -> Vec<String> {
        self.records.iter().rev().map(LogRecord::display_line).collect()
    }

    /// Count records of one category
    pub fn count_kind(&self, kind: &str) -> usize {
        self.records.iter().filter(|r| r.kind == kind).count()
    }

    pub fn export_delimited(&self) -> String {
        delimited::to_delimited_text(self)
    }
}
