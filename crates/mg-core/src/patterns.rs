//! Banned SQL patterns and breaking-change heuristics.
//!
//! The banned-patterns file holds one case-insensitive regex per line. Blank
//! lines and lines starting with `#` are skipped; comment lines directly above
//! a pattern become its note:
//!
//! ```text
//! # Tables are removed through a deprecation cycle, never directly
//! DROP\s+TABLE
//!
//! TRUNCATE
//! ```

use crate::error::{CoreError, CoreResult};
use regex::{Regex, RegexBuilder};
use std::path::Path;
use std::sync::OnceLock;

/// A single banned pattern
#[derive(Debug, Clone)]
pub struct BannedPattern {
    /// Pattern text as written in the file
    pub source: String,
    /// Compiled case-insensitive regex
    pub regex: Regex,
    /// Comment lines preceding the pattern, joined with spaces
    pub note: Option<String>,
}

impl BannedPattern {
    pub fn is_match(&self, content: &str) -> bool {
        self.regex.is_match(content)
    }
}

/// Ordered set of banned patterns applied to every migration
#[derive(Debug, Clone, Default)]
pub struct BannedPatternSet {
    patterns: Vec<BannedPattern>,
}

impl BannedPatternSet {
    /// Parse patterns from file content. `origin` names the source in errors.
    pub fn parse(content: &str, origin: &str) -> CoreResult<Self> {
        let mut patterns = Vec::new();
        let mut pending_note: Vec<&str> = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                pending_note.clear();
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix('#') {
                let comment = comment.trim();
                if !comment.is_empty() {
                    pending_note.push(comment);
                }
                continue;
            }

            let regex = RegexBuilder::new(trimmed)
                .case_insensitive(true)
                .build()
                .map_err(|e| CoreError::InvalidBannedPattern {
                    path: origin.to_string(),
                    line: idx + 1,
                    source: e,
                })?;
            let note = (!pending_note.is_empty()).then(|| pending_note.join(" "));
            pending_note.clear();

            patterns.push(BannedPattern {
                source: trimmed.to_string(),
                regex,
                note,
            });
        }

        Ok(Self { patterns })
    }

    /// Load patterns from a file.
    ///
    /// A missing file is not an error: it yields `Ok(None)` so the caller can
    /// warn and skip the banned-pattern phase.
    pub fn load(path: &Path) -> CoreResult<Option<Self>> {
        if !path.is_file() {
            log::debug!("Banned patterns file not found: {}", path.display());
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string()).map(Some)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BannedPattern> {
        self.patterns.iter()
    }
}

/// Kind of heuristically breaking SQL fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakingFragment {
    /// `ALTER COLUMN ... NOT NULL` within one statement
    AlterColumnNotNull,
    /// `DROP COLUMN`
    DropColumn,
    /// `RENAME COLUMN`
    RenameColumn,
}

impl BreakingFragment {
    pub const ALL: [BreakingFragment; 3] = [
        BreakingFragment::AlterColumnNotNull,
        BreakingFragment::DropColumn,
        BreakingFragment::RenameColumn,
    ];

    /// Human-readable fragment text used in warnings
    pub fn label(&self) -> &'static str {
        match self {
            BreakingFragment::AlterColumnNotNull => "ALTER COLUMN ... NOT NULL",
            BreakingFragment::DropColumn => "DROP COLUMN",
            BreakingFragment::RenameColumn => "RENAME COLUMN",
        }
    }

    fn regex(&self) -> &'static Regex {
        static ALTER_NOT_NULL: OnceLock<Regex> = OnceLock::new();
        static DROP_COLUMN: OnceLock<Regex> = OnceLock::new();
        static RENAME_COLUMN: OnceLock<Regex> = OnceLock::new();

        let (cell, pattern) = match self {
            BreakingFragment::AlterColumnNotNull => {
                (&ALTER_NOT_NULL, r"(?i)\bALTER\s+COLUMN\b[^;]*\bNOT\s+NULL\b")
            }
            BreakingFragment::DropColumn => (&DROP_COLUMN, r"(?i)\bDROP\s+COLUMN\b"),
            BreakingFragment::RenameColumn => (&RENAME_COLUMN, r"(?i)\bRENAME\s+COLUMN\b"),
        };
        cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
    }

    /// Fragments found anywhere in `content`, in declaration order.
    pub fn scan(content: &str) -> Vec<BreakingFragment> {
        Self::ALL
            .into_iter()
            .filter(|f| f.regex().is_match(content))
            .collect()
    }
}

impl std::fmt::Display for BreakingFragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
#[path = "patterns_test.rs"]
mod tests;
