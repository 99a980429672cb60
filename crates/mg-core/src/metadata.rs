//! Migration metadata headers.
//!
//! Every migration carries a change-management header in its leading comment:
//!
//! ```sql
//! /*---
//! change_id: CHG-0042
//! title: Add orders table
//! risk: low
//! change_type: additive
//! backward_compatible: true
//! reviewers: ["alice", "bob"]
//! ---*/
//! CREATE TABLE orders (...);
//! ```
//!
//! The block is a flat list of `key: value` lines. Values are interpreted with
//! a small set of tolerance rules: matching quotes are stripped, unquoted
//! `true`/`false` become booleans, and bracketed values are parsed as JSON
//! arrays with a fallback to the raw string.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

/// Token opening a metadata block
pub const HEADER_START: &str = "/*---";

/// Token closing a metadata block
pub const HEADER_END: &str = "---*/";

/// Field names recognized in a metadata header.
pub mod fields {
    pub const CHANGE_ID: &str = "change_id";
    pub const TITLE: &str = "title";
    pub const TICKET: &str = "ticket";
    pub const RISK: &str = "risk";
    pub const CHANGE_TYPE: &str = "change_type";
    pub const BACKWARD_COMPATIBLE: &str = "backward_compatible";
    pub const BACKFILL_REQUIRED: &str = "backfill_required";
    pub const OWNER: &str = "owner";
    pub const REVIEWERS: &str = "reviewers";
    pub const ROLLOUT_PLAN: &str = "rollout_plan";
    pub const ROLLBACK_PLAN: &str = "rollback_plan";

    /// All recognized fields, in header order.
    pub const ALL: &[&str] = &[
        CHANGE_ID,
        TITLE,
        TICKET,
        RISK,
        CHANGE_TYPE,
        BACKWARD_COMPATIBLE,
        BACKFILL_REQUIRED,
        OWNER,
        REVIEWERS,
        ROLLOUT_PLAN,
        ROLLBACK_PLAN,
    ];
}

static BLOCK_RE: OnceLock<Regex> = OnceLock::new();
static LINE_RE: OnceLock<Regex> = OnceLock::new();

fn block_re() -> &'static Regex {
    BLOCK_RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?s){}(.*?){}",
            regex::escape(HEADER_START),
            regex::escape(HEADER_END)
        ))
        .expect("valid regex")
    })
}

fn line_re() -> &'static Regex {
    LINE_RE.get_or_init(|| Regex::new(r"^\s*([\w-]+)\s*:\s*(.*?)\s*$").expect("valid regex"))
}

/// A single metadata value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    String(String),
    Bool(bool),
    List(Vec<String>),
}

impl MetadataValue {
    /// Interpret a raw value taken from a `key: value` line.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        if let Some(unquoted) = strip_matching_quotes(raw) {
            return MetadataValue::String(unquoted.to_string());
        }

        match raw {
            "true" => return MetadataValue::Bool(true),
            "false" => return MetadataValue::Bool(false),
            _ => {}
        }

        if raw.starts_with('[') && raw.ends_with(']') {
            match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
                Ok(items) => {
                    return MetadataValue::List(
                        items
                            .into_iter()
                            .map(|item| match item {
                                serde_json::Value::String(s) => s,
                                other => other.to_string(),
                            })
                            .collect(),
                    );
                }
                Err(e) => {
                    log::debug!("Keeping malformed list value {raw:?} as a string: {e}");
                }
            }
        }

        MetadataValue::String(raw.to_string())
    }

    /// The value as a string slice, if it is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetadataValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetadataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            MetadataValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Whether the value counts as empty for required-field checks.
    ///
    /// Booleans are never blank.
    pub fn is_blank(&self) -> bool {
        match self {
            MetadataValue::String(s) => s.trim().is_empty(),
            MetadataValue::Bool(_) => false,
            MetadataValue::List(items) => items.is_empty(),
        }
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::String(s) => write!(f, "{}", s),
            MetadataValue::Bool(b) => write!(f, "{}", b),
            MetadataValue::List(items) => write!(f, "{}", items.join(", ")),
        }
    }
}

/// Return the inner text when `raw` is wrapped in a matching pair of quotes.
fn strip_matching_quotes(raw: &str) -> Option<&str> {
    if raw.len() < 2 {
        return None;
    }
    ['"', '\'']
        .into_iter()
        .find(|q| raw.starts_with(*q) && raw.ends_with(*q))
        .map(|_| &raw[1..raw.len() - 1])
}

/// Parsed metadata header of one migration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataHeader {
    values: BTreeMap<String, MetadataValue>,
}

impl MetadataHeader {
    /// Create an empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: MetadataValue) {
        self.values.insert(key.into(), value);
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.values.get(key)
    }

    /// Whether the field is present with a non-blank value.
    pub fn has_value(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_blank())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn risk(&self) -> Option<&MetadataValue> {
        self.get(fields::RISK)
    }

    pub fn change_type(&self) -> Option<&MetadataValue> {
        self.get(fields::CHANGE_TYPE)
    }

    /// Explicit boolean `backward_compatible` flag, if declared.
    pub fn backward_compatible(&self) -> Option<bool> {
        self.get(fields::BACKWARD_COMPATIBLE)
            .and_then(MetadataValue::as_bool)
    }

    /// Explicit boolean `backfill_required` flag, if declared.
    pub fn backfill_required(&self) -> Option<bool> {
        self.get(fields::BACKFILL_REQUIRED)
            .and_then(MetadataValue::as_bool)
    }

    /// Reviewer list. A malformed list that degraded to a string yields `None`.
    pub fn reviewers(&self) -> Option<&[String]> {
        self.get(fields::REVIEWERS).and_then(MetadataValue::as_list)
    }
}

/// Locate the metadata block in raw file content.
///
/// Returns the trimmed text between the first start token and the first end
/// token following it. Later blocks are ignored.
pub fn extract_header_block(content: &str) -> Option<&str> {
    block_re()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

/// Parse the `key: value` lines of a metadata block.
///
/// Lines that are not `key: value` pairs are ignored. A repeated key keeps
/// its last value.
pub fn parse_header(block: &str) -> MetadataHeader {
    let mut header = MetadataHeader::new();
    for line in block.lines() {
        let Some(caps) = line_re().captures(line) else {
            continue;
        };
        header.insert(&caps[1], MetadataValue::parse(&caps[2]));
    }
    header
}

/// Extract and parse the metadata header of a migration, if it has one.
pub fn read_header(content: &str) -> Option<MetadataHeader> {
    extract_header_block(content).map(parse_header)
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
