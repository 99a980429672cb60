//! Leveled, timestamped console output.
//!
//! Every line has the form `[YYYY-MM-DD HH:MM:SS] [LEVEL] message`. ERROR
//! lines go to stderr, everything else to stdout.

use chrono::{DateTime, Local};
use mg_core::{EventLevel, ValidationEvent, ValidationReport};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format one log line.
pub(crate) fn format_line(at: &DateTime<Local>, level: EventLevel, message: &str) -> String {
    format!("[{}] [{}] {}", at.format(TIMESTAMP_FORMAT), level, message)
}

/// Print one line to the stream matching its level.
pub(crate) fn emit(level: EventLevel, message: &str) {
    let line = format_line(&Local::now(), level, message);
    match level {
        EventLevel::Error => eprintln!("{}", line),
        _ => println!("{}", line),
    }
}

pub(crate) fn emit_event(event: &ValidationEvent) {
    emit(event.level, &event.message);
}

/// Print every event of a report in order.
pub(crate) fn emit_report(report: &ValidationReport) {
    for event in &report.events {
        emit_event(event);
    }
}

#[cfg(test)]
#[path = "output_test.rs"]
mod tests;
