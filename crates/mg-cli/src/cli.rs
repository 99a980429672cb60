//! CLI argument definitions using clap derive API

use clap::Parser;
use std::path::PathBuf;

/// Default directory holding versioned migrations
pub const DEFAULT_MIGRATIONS_DIR: &str = "migrations";

/// Default policy document
pub const DEFAULT_POLICY_FILE: &str = "policy/migration-policy.yaml";

/// Default banned-patterns list
pub const DEFAULT_BANNED_PATTERNS_FILE: &str = "policy/banned-patterns.txt";

/// Environment variable overriding the policy's filename pattern
pub const FILENAME_PATTERN_ENV: &str = "MG_FILENAME_PATTERN";

/// Environment variable naming a path for the JSON report
pub const REPORT_JSON_ENV: &str = "MG_REPORT_JSON";

/// Migration Guard - policy gate for versioned SQL migrations
#[derive(Parser, Debug)]
#[command(name = "mg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory containing V###__*.sql migrations
    #[arg(default_value = DEFAULT_MIGRATIONS_DIR)]
    pub migrations_dir: PathBuf,

    /// Policy file (YAML or JSON)
    #[arg(default_value = DEFAULT_POLICY_FILE)]
    pub policy_file: PathBuf,

    /// Banned patterns file, one case-insensitive regex per line
    #[arg(default_value = DEFAULT_BANNED_PATTERNS_FILE)]
    pub banned_patterns_file: PathBuf,

    /// Filename pattern overriding the policy's `filenamePattern`.
    /// Environment only, never a flag.
    #[arg(skip = env_override(FILENAME_PATTERN_ENV))]
    pub filename_pattern: Option<String>,

    /// Also write the validation report as JSON to this path.
    /// Environment only, never a flag.
    #[arg(skip = env_override(REPORT_JSON_ENV).map(PathBuf::from))]
    pub report_json: Option<PathBuf>,
}

/// Non-empty value of an environment variable
fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
