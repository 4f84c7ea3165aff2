//! Delimited-text log export
//!
//! Format: UTF-8 with a BOM, header `Timestamp,Type,Content`, one
//! newline-terminated row per record. Content is never quoted; characters
//! that would break the row are replaced with a space instead.

use crate::event_log::EventLog;
use std::borrow::Cow;

pub const BOM: char = '\u{FEFF}';
pub const DELIMITER: char = ',';
pub const HEADER: &str = "Timestamp,Type,Content";
pub const LOG_FILE_NAME: &str = "info_capture_log.csv";
pub const CSV_MIME: &str = "text/csv;charset=utf-8";

fn breaks_row(c: char) -> bool {
    c == DELIMITER || c == '\n' || c == '\r'
}

/// Replace delimiter and line-break characters with a space
pub fn sanitize_content(content: &str) -> Cow<'_, str> {
    if content.contains(breaks_row) {
        Cow::Owned(content.replace(breaks_row, " "))
    } else {
        Cow::Borrowed(content)
    }
}

pub fn to_delimited_text(log: &EventLog) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(HEADER);
    out.push('\n');

    for record in log.records() {
        out.push_str(&record.iso_time());
        out.push(DELIMITER);
        out.push_str(&sanitize_content(&record.kind));
        out.push(DELIMITER);
        out.push_str(&sanitize_content(&record.content));
        out.push('\n');
    }

    out
}
