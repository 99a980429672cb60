//! Validation events and run totals.

use serde::Serialize;
use std::fmt;

/// Severity of a validation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventLevel {
    Info,
    Success,
    Warn,
    Error,
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventLevel::Info => write!(f, "INFO"),
            EventLevel::Success => write!(f, "SUCCESS"),
            EventLevel::Warn => write!(f, "WARN"),
            EventLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// One recorded outcome of a check, or a run-level notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationEvent {
    pub level: EventLevel,
    pub message: String,
    /// Filename the event concerns; `None` for run-level events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl fmt::Display for ValidationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Accumulates events and counters across a validation run.
///
/// `validations` counts executed checks; `failures` counts checks that
/// produced an ERROR. Run-level notices recorded with [`info`](Self::info) or
/// [`warn`](Self::warn) do not touch the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub events: Vec<ValidationEvent>,
    pub validations: usize,
    pub failures: usize,
    pub files: usize,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, level: EventLevel, message: String, file: Option<&str>) {
        self.events.push(ValidationEvent {
            level,
            message,
            file: file.map(String::from),
        });
    }

    /// Record a passing check.
    pub fn pass(&mut self, file: &str, message: impl Into<String>) {
        self.validations += 1;
        self.push(EventLevel::Success, message.into(), Some(file));
    }

    /// Record a failing check.
    pub fn fail(&mut self, file: &str, message: impl Into<String>) {
        self.validations += 1;
        self.failures += 1;
        self.push(EventLevel::Error, message.into(), Some(file));
    }

    /// Count a check that only ever produces advisory warnings.
    pub fn count_check(&mut self) {
        self.validations += 1;
    }

    /// Record an advisory warning. Never counts as a failure.
    pub fn warn(&mut self, file: Option<&str>, message: impl Into<String>) {
        self.push(EventLevel::Warn, message.into(), file);
    }

    /// Record an informational notice.
    pub fn info(&mut self, file: Option<&str>, message: impl Into<String>) {
        self.push(EventLevel::Info, message.into(), file);
    }

    pub fn count(&self, level: EventLevel) -> usize {
        self.events.iter().filter(|e| e.level == level).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(EventLevel::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(EventLevel::Warn)
    }

    /// Events concerning one file, in order.
    pub fn events_for<'a>(&'a self, file: &'a str) -> impl Iterator<Item = &'a ValidationEvent> {
        self.events
            .iter()
            .filter(move |e| e.file.as_deref() == Some(file))
    }

    /// Event levels in order, for comparing runs.
    pub fn levels(&self) -> Vec<EventLevel> {
        self.events.iter().map(|e| e.level).collect()
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.files == 0 {
            RunOutcome::NoMigrations
        } else if self.failures == 0 {
            RunOutcome::Passed
        } else {
            RunOutcome::Failed
        }
    }
}

/// Overall result of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// No migration files were discovered
    NoMigrations,
    /// All checks passed
    Passed,
    /// At least one check failed
    Failed,
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::NoMigrations | RunOutcome::Passed => 0,
            RunOutcome::Failed => 1,
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code() == 0
    }
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
