// LogGather - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies.
//
// These types are the shared vocabulary across all layers.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

// =============================================================================
// Extraction rules (runtime representation)
// =============================================================================

/// How a rule turns the matches of its pattern into one datum.
///
/// `single` and `indexed` in criteria files both map to `Indexed`; they
/// never behaved differently.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExtractMode {
    /// Pick one match by position. Negative positions count from the end.
    Indexed { index: i64 },

    /// Mean of all matched numbers after dividing each by `10^exponent`.
    Averaged { exponent: i32, round: bool },

    /// Every match rendered as `"<group1> (<group2>)"`, comma-joined.
    Dual,
}

impl ExtractMode {
    /// Name used in logs and diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            ExtractMode::Indexed { .. } => "indexed",
            ExtractMode::Averaged { .. } => "averaged",
            ExtractMode::Dual => "dual",
        }
    }
}

impl std::fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A validated, compiled extraction rule.
///
/// Built from `RawRule` (the deserialized criteria entry) by
/// `core::criteria::compile`. Immutable once built.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Compiled pattern. Dual-mode patterns are compiled with `.` matching
    /// newlines so a match can span lines.
    pub pattern: Regex,

    /// Extraction mode and its parameters.
    pub mode: ExtractMode,
}

/// One datum key and the rule that produces it from a given log.
#[derive(Debug, Clone)]
pub struct DatumRule {
    pub datum_key: String,
    pub rule: Rule,
}

// =============================================================================
// Table layout
// =============================================================================

/// One row of a report table: the datum key it shows and its display label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpec {
    pub key: String,
    pub label: String,
}

/// Layout of one rendered table. Rows appear in the order listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: String,
    pub rows: Vec<RowSpec>,
}

/// Fully loaded criteria: rules per log file name plus the ordered tables.
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    /// log file name -> rules applied to that log, in configured order.
    pub per_log: BTreeMap<String, Vec<DatumRule>>,

    /// Tables in configured order. Order is significant and never re-sorted.
    pub tables: Vec<TableSpec>,
}

impl Criteria {
    /// Rules configured for `log_name`, or an empty slice if none.
    pub fn rules_for_log(&self, log_name: &str) -> &[DatumRule] {
        self.per_log
            .get(log_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True if any rule is keyed to `log_name`.
    pub fn wants_log(&self, log_name: &str) -> bool {
        self.per_log.contains_key(log_name)
    }

    /// Total number of configured rules across all logs.
    pub fn rule_count(&self) -> usize {
        self.per_log.values().map(Vec::len).sum()
    }
}

// =============================================================================
// Aggregation
// =============================================================================

/// The per-source, per-datum-key collection of extracted values.
///
/// `BTreeMap` keeps sources and keys sorted so every reader (renderer,
/// exporters) sees the same deterministic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Gathering {
    pub(crate) sources: BTreeMap<String, BTreeMap<String, String>>,
}

// =============================================================================
// Discovery
// =============================================================================

/// A log file found under a source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLog {
    /// Source identifier: name of the top-level directory under the root.
    pub source: String,

    /// File name, used to look up the rules that apply to it.
    pub log_name: String,

    /// Absolute or root-relative path to the file.
    pub path: PathBuf,

    /// File size in bytes.
    pub size: u64,
}

// =============================================================================
// Output format
// =============================================================================

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain-text org-mode tables (the primary report).
    #[default]
    Org,
    /// Long-form CSV: source, datum, value.
    Csv,
    /// Nested JSON object: source -> datum -> value.
    Json,
}

impl OutputFormat {
    /// Parse a format name as used on the CLI and in config.toml.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "org" => Some(OutputFormat::Org),
            "csv" => Some(OutputFormat::Csv),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Org => "org",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
