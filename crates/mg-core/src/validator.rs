//! Per-file migration checks.
//!
//! Each check records its outcome into a [`ValidationReport`] and never
//! aborts: a failing check is an ERROR event, an advisory finding is a WARN
//! event. For every file the checks run in a fixed order (metadata header,
//! required fields, enum fields, filename, banned patterns, backward
//! compatibility), each independent of the others.

use crate::error::CoreResult;
use crate::metadata::{self, fields, MetadataHeader, MetadataValue};
use crate::migration::MigrationFile;
use crate::patterns::{BannedPatternSet, BreakingFragment};
use crate::policy::Policy;
use crate::report::ValidationReport;
use regex::Regex;

/// Validates migrations against one policy and one banned-pattern set
#[derive(Debug, Clone)]
pub struct MigrationValidator {
    policy: Policy,
    filename_re: Regex,
    banned: Option<BannedPatternSet>,
}

impl MigrationValidator {
    /// Build a validator. `banned` is `None` when no banned-patterns file was
    /// found, which skips that phase for every file.
    pub fn new(policy: Policy, banned: Option<BannedPatternSet>) -> CoreResult<Self> {
        let filename_re = policy.filename_regex()?;
        Ok(Self {
            policy,
            filename_re,
            banned,
        })
    }

    /// Run every check against one file.
    pub fn validate_file(&self, file: &MigrationFile, report: &mut ValidationReport) {
        let name = file.filename.as_str();
        report.info(Some(name), format!("Validating {}", name));
        report.files += 1;

        if let Some(reason) = &file.read_error {
            report.fail(name, format!("Cannot read {}: {}", name, reason));
            return;
        }

        let header = check_header(&file.raw_content, name, report);
        check_required_fields(&header, &self.policy.required_fields, name, report);
        check_enum_fields(&header, &self.policy, name, report);
        check_filename(name, &self.filename_re, &self.policy.filename_pattern, report);
        if let Some(banned) = &self.banned {
            check_banned_patterns(&file.raw_content, banned, name, report);
        }
        check_backward_compatibility(&header, &file.raw_content, name, report);
    }

    /// Validate every file in order and append the run summary.
    ///
    /// With no files the run ends with a single WARN and no summary.
    pub fn validate_all(&self, files: &[MigrationFile], report: &mut ValidationReport) {
        if files.is_empty() {
            report.warn(None, "No migration files found");
            return;
        }

        report.info(None, format!("Found {} migration file(s)", files.len()));
        for file in files {
            self.validate_file(file, report);
        }
        report.info(
            None,
            format!(
                "Validation complete: {} validations, {} failures",
                report.validations, report.failures
            ),
        );
    }
}

/// Locate and parse the metadata header. One check.
///
/// A missing header fails and yields an empty header, so required-field
/// checks still run and fail in turn.
pub fn check_header(content: &str, file: &str, report: &mut ValidationReport) -> MetadataHeader {
    match metadata::read_header(content) {
        Some(header) => {
            report.pass(file, format!("Metadata header found in {}", file));
            header
        }
        None => {
            report.fail(file, format!("Missing metadata header in {}", file));
            MetadataHeader::new()
        }
    }
}

/// One check per required field: present and non-blank.
pub fn check_required_fields(
    header: &MetadataHeader,
    required: &[String],
    file: &str,
    report: &mut ValidationReport,
) {
    for field in required {
        if header.has_value(field) {
            report.pass(file, format!("Required field '{}' present in {}", field, file));
        } else {
            report.fail(file, format!("Missing required field '{}' in {}", field, file));
        }
    }
}

/// Check `risk` and `change_type` against the policy, one check each when
/// the field is present. Absent fields produce no event. Only plain string
/// values can match; booleans and lists always fail.
pub fn check_enum_fields(
    header: &MetadataHeader,
    policy: &Policy,
    file: &str,
    report: &mut ValidationReport,
) {
    if let Some(value) = header.risk() {
        check_enum_value(
            "risk level",
            value,
            &policy.risk_levels,
            value.as_str().is_some_and(|v| policy.allows_risk(v)),
            file,
            report,
        );
    }
    if let Some(value) = header.change_type() {
        check_enum_value(
            "change type",
            value,
            &policy.change_types,
            value.as_str().is_some_and(|v| policy.allows_change_type(v)),
            file,
            report,
        );
    }
}

fn check_enum_value(
    label: &str,
    value: &MetadataValue,
    allowed: &[String],
    is_allowed: bool,
    file: &str,
    report: &mut ValidationReport,
) {
    let shown = value.to_string();
    let shown = shown.trim();
    if is_allowed {
        report.pass(file, format!("Valid {} '{}' in {}", label, shown, file));
    } else {
        report.fail(
            file,
            format!(
                "Invalid {} '{}' in {} (allowed: {})",
                label,
                shown,
                file,
                allowed.join(", ")
            ),
        );
    }
}

/// Check the filename against the naming convention. One check.
pub fn check_filename(
    filename: &str,
    pattern: &Regex,
    pattern_text: &str,
    report: &mut ValidationReport,
) {
    if pattern.is_match(filename) {
        report.pass(filename, format!("Filename {} follows naming convention", filename));
    } else {
        report.fail(
            filename,
            format!(
                "Filename {} does not match required pattern {}",
                filename, pattern_text
            ),
        );
    }
}

/// One check per banned pattern; a match anywhere in the content fails.
pub fn check_banned_patterns(
    content: &str,
    banned: &BannedPatternSet,
    file: &str,
    report: &mut ValidationReport,
) {
    for pattern in banned.iter() {
        if !pattern.is_match(content) {
            report.count_check();
            continue;
        }
        let message = match &pattern.note {
            Some(note) => format!(
                "Banned pattern '{}' found in {} ({})",
                pattern.source, file, note
            ),
            None => format!("Banned pattern '{}' found in {}", pattern.source, file),
        };
        report.fail(file, message);
    }
}

/// Advisory backward-compatibility review. Counts as one check and only ever
/// emits warnings.
pub fn check_backward_compatibility(
    header: &MetadataHeader,
    content: &str,
    file: &str,
    report: &mut ValidationReport,
) {
    report.count_check();

    if header.backward_compatible() == Some(false) {
        report.warn(
            Some(file),
            format!(
                "{} declares {}: false and needs special review",
                file,
                fields::BACKWARD_COMPATIBLE
            ),
        );
    }

    for fragment in BreakingFragment::scan(content) {
        report.warn(
            Some(file),
            format!("Potentially breaking operation '{}' in {}", fragment, file),
        );
    }
}

#[cfg(test)]
#[path = "validator_test.rs"]
mod tests;
