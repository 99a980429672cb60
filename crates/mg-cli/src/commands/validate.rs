//! Validate command implementation

use anyhow::{Context, Result};
use mg_core::{
    discover_migrations, BannedPatternSet, MigrationValidator, Policy, RunOutcome,
    ValidationReport,
};
use serde::Serialize;
use std::path::Path;

use crate::cli::Cli;
use crate::commands::common::ExitCode;
use crate::output;

/// JSON report written when `MG_REPORT_JSON` is set
#[derive(Serialize)]
struct JsonReport<'a> {
    outcome: RunOutcome,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

/// Execute the validate command
pub(crate) fn execute(cli: &Cli) -> Result<()> {
    let report = build_report(cli)?;

    output::emit_report(&report);

    if let Some(path) = &cli.report_json {
        write_json_report(path, &report)?;
    }

    let outcome = report.outcome();
    log::debug!(
        "Run finished: {:?} ({} validations, {} failures, {} files)",
        outcome,
        report.validations,
        report.failures,
        report.files
    );
    if !outcome.is_success() {
        return Err(ExitCode(outcome.exit_code()).into());
    }
    Ok(())
}

/// Load every input and validate all discovered migrations.
///
/// Missing policy or migrations directory aborts before any file is checked.
/// A missing banned-patterns file only adds a warning.
pub(crate) fn build_report(cli: &Cli) -> Result<ValidationReport> {
    let mut policy = Policy::load(&cli.policy_file).context("Failed to load migration policy")?;
    if let Some(pattern) = &cli.filename_pattern {
        log::debug!("Filename pattern overridden: {pattern}");
        policy = policy.with_filename_pattern(pattern.as_str());
    }

    let files = discover_migrations(&cli.migrations_dir).context("Failed to discover migrations")?;
    let banned = BannedPatternSet::load(&cli.banned_patterns_file)
        .context("Failed to load banned patterns")?;

    let mut report = ValidationReport::new();
    report.info(
        None,
        format!(
            "Validating migrations in {} against {}",
            cli.migrations_dir.display(),
            cli.policy_file.display()
        ),
    );
    match &banned {
        Some(set) => report.info(
            None,
            format!(
                "Loaded {} banned pattern(s) from {}",
                set.len(),
                cli.banned_patterns_file.display()
            ),
        ),
        None => report.warn(
            None,
            format!(
                "Banned patterns file not found: {}; skipping banned pattern checks",
                cli.banned_patterns_file.display()
            ),
        ),
    }

    let validator = MigrationValidator::new(policy, banned).context("Invalid migration policy")?;
    validator.validate_all(&files, &mut report);
    Ok(report)
}

fn write_json_report(path: &Path, report: &ValidationReport) -> Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport {
        outcome: report.outcome(),
        report,
    })
    .context("Failed to serialize validation report")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
