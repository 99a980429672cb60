//! Migration policy loading.
//!
//! The policy is a declarative YAML (or JSON) document:
//!
//! ```yaml
//! requiredFields: [change_id, title, risk, change_type, owner]
//! riskLevels: [low, medium, high]
//! changeTypes: [additive, modification, deprecation, removal]
//! filenamePattern: '^V\d{3}__.+\.sql$'
//! ```
//!
//! Keys may also be written in snake_case.

use crate::error::{CoreError, CoreResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default versioned-migration naming convention: `V###__description.sql`
pub const DEFAULT_FILENAME_PATTERN: &str = r"^V\d{3}__.+\.sql$";

/// Declarative ruleset migrations are checked against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// Fields that must be present and non-empty in every header
    #[serde(default, alias = "required_fields")]
    pub required_fields: Vec<String>,

    /// Allowed values of the `risk` field
    #[serde(default = "default_risk_levels", alias = "risk_levels")]
    pub risk_levels: Vec<String>,

    /// Allowed values of the `change_type` field
    #[serde(default = "default_change_types", alias = "change_types")]
    pub change_types: Vec<String>,

    /// Regex the migration filename must match
    #[serde(default = "default_filename_pattern", alias = "filename_pattern")]
    pub filename_pattern: String,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            required_fields: Vec::new(),
            risk_levels: default_risk_levels(),
            change_types: default_change_types(),
            filename_pattern: default_filename_pattern(),
        }
    }
}

fn default_risk_levels() -> Vec<String> {
    ["low", "medium", "high"].map(String::from).to_vec()
}

fn default_change_types() -> Vec<String> {
    ["additive", "modification", "deprecation", "removal"]
        .map(String::from)
        .to_vec()
}

fn default_filename_pattern() -> String {
    DEFAULT_FILENAME_PATTERN.to_string()
}

impl Policy {
    /// Load a policy from a YAML or JSON file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::PolicyNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let policy: Policy =
            serde_yaml::from_str(&content).map_err(|e| CoreError::PolicyParse {
                path: path.display().to_string(),
                source: e,
            })?;
        policy.validate()?;
        Ok(policy)
    }

    /// Replace the filename pattern, e.g. from a driver-script override.
    pub fn with_filename_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.filename_pattern = pattern.into();
        self
    }

    /// Compile the filename pattern.
    pub fn filename_regex(&self) -> CoreResult<Regex> {
        Regex::new(&self.filename_pattern).map_err(|e| CoreError::InvalidFilenamePattern {
            pattern: self.filename_pattern.clone(),
            source: e,
        })
    }

    /// Whether `value` is an allowed risk level (trimmed, case-insensitive).
    pub fn allows_risk(&self, value: &str) -> bool {
        contains_ignore_case(&self.risk_levels, value)
    }

    /// Whether `value` is an allowed change type (trimmed, case-insensitive).
    pub fn allows_change_type(&self, value: &str) -> bool {
        contains_ignore_case(&self.change_types, value)
    }

    fn validate(&self) -> CoreResult<()> {
        if self.risk_levels.is_empty() {
            return Err(CoreError::PolicyInvalid {
                message: "riskLevels must list at least one value".to_string(),
            });
        }
        if self.change_types.is_empty() {
            return Err(CoreError::PolicyInvalid {
                message: "changeTypes must list at least one value".to_string(),
            });
        }
        if let Some(blank) = self.required_fields.iter().find(|f| f.trim().is_empty()) {
            return Err(CoreError::PolicyInvalid {
                message: format!("requiredFields contains a blank entry: {:?}", blank),
            });
        }
        self.filename_regex()?;
        Ok(())
    }
}

fn contains_ignore_case(allowed: &[String], value: &str) -> bool {
    let value = value.trim();
    allowed.iter().any(|a| a.trim().eq_ignore_ascii_case(value))
}

#[cfg(test)]
#[path = "policy_test.rs"]
mod tests;
