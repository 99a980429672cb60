//! Error types for mg-core

use thiserror::Error;

/// Setup errors that abort a validation run before any file is checked.
///
/// Per-file problems are never errors of this type; they are recorded as
/// events in a [`ValidationReport`](crate::report::ValidationReport).
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Policy file not found
    #[error("[E001] Policy file not found: {path}")]
    PolicyNotFound { path: String },

    /// E002: Failed to parse policy file
    #[error("[E002] Failed to parse policy {path}")]
    PolicyParse {
        path: String,
        source: serde_yaml::Error,
    },

    /// E003: Invalid policy value
    #[error("[E003] Invalid policy: {message}")]
    PolicyInvalid { message: String },

    /// E004: Migrations directory not found
    #[error("[E004] Migrations directory not found: {path}")]
    MigrationsDirNotFound { path: String },

    /// E005: Banned pattern does not compile
    #[error("[E005] Invalid banned pattern on line {line} of {path}")]
    InvalidBannedPattern {
        path: String,
        line: usize,
        source: regex::Error,
    },

    /// E006: Filename pattern does not compile
    #[error("[E006] Invalid filename pattern '{pattern}'")]
    InvalidFilenamePattern {
        pattern: String,
        source: regex::Error,
    },

    /// E007: IO error with file path context
    #[error("[E007] Failed to read '{path}'")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
