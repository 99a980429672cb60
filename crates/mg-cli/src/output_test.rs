use super::*;
use chrono::TimeZone;

#[test]
fn line_has_timestamp_level_and_message() {
    let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
    let line = format_line(&at, EventLevel::Success, "Metadata header found");
    assert_eq!(line, "[2024-03-09 07:05:01] [SUCCESS] Metadata header found");
}

#[test]
fn every_level_renders_uppercase() {
    let at = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for (level, name) in [
        (EventLevel::Info, "[INFO]"),
        (EventLevel::Success, "[SUCCESS]"),
        (EventLevel::Warn, "[WARN]"),
        (EventLevel::Error, "[ERROR]"),
    ] {
        assert!(format_line(&at, level, "x").contains(name));
    }
}
