// LogGather - core/criteria.rs
//
// Criteria loading and validation.
// Core layer: accepts JSON/TOML strings, never touches the filesystem.
// I/O is handled by app::criteria_loader which feeds content here.
//
// A criteria document has two sections:
//   criteria_per_log   : log file name -> datum key -> rule
//   criteria_per_table : table name -> row key -> row label
//
// Map order in the document is significant for tables and rows, so both
// sections are read through `OrderedMap` and end up as explicit Vecs.

use crate::core::extract::compile_pattern;
use crate::core::model::{Criteria, DatumRule, ExtractMode, RowSpec, Rule, TableSpec};
use crate::util::constants;
use crate::util::error::CriteriaError;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

// =============================================================================
// Raw deserialization structures
// =============================================================================

/// String-keyed map that remembers document order.
///
/// A repeated key keeps its first position and takes the last value.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with string keys")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> =
                    Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    match entries.iter_mut().find(|(existing, _)| *existing == key) {
                        Some(slot) => slot.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(OrderedMap(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Raw criteria document as deserialized from JSON or TOML.
/// This is validated and compiled into a `Criteria` for runtime use.
#[derive(Debug, Default, Deserialize)]
pub struct CriteriaDefinition {
    #[serde(default)]
    pub criteria_per_log: OrderedMap<OrderedMap<RawRule>>,
    #[serde(default)]
    pub criteria_per_table: OrderedMap<OrderedMap<String>>,
}

/// Raw rule entry.
///
/// Accepts both the current field names and the legacy ones (`regex`, `idx`,
/// `exp`, plus the `dual` / `average` flags that selected the mode before
/// `mode` existed).
#[derive(Debug, Default, Deserialize)]
pub struct RawRule {
    #[serde(default, alias = "regex")]
    pub pattern: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, alias = "idx")]
    pub index: i64,
    #[serde(default, alias = "exp")]
    pub exponent: i32,
    #[serde(default)]
    pub round: bool,
    #[serde(default)]
    pub dual: bool,
    #[serde(default)]
    pub average: bool,
}

// =============================================================================
// Parsing
// =============================================================================

/// Parse a JSON string into a `CriteriaDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_criteria_json(
    content: &str,
    source_path: &Path,
) -> Result<CriteriaDefinition, CriteriaError> {
    serde_json::from_str(content).map_err(|e| CriteriaError::JsonParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Parse a TOML string into a `CriteriaDefinition`.
pub fn parse_criteria_toml(
    content: &str,
    source_path: &Path,
) -> Result<CriteriaDefinition, CriteriaError> {
    toml::from_str(content).map_err(|e| CriteriaError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

// =============================================================================
// Validation and compilation
// =============================================================================

/// Validate a `CriteriaDefinition` and compile it into runtime `Criteria`.
///
/// Validates, per rule:
/// - the pattern is present, within size limits, and compiles
/// - the mode is one of single, indexed, averaged, dual
/// - dual patterns declare exactly two capture groups
///
/// The first invalid rule aborts loading. Table rows that no rule can fill
/// are only warned about; they render as empty rows.
pub fn validate_and_compile(def: CriteriaDefinition) -> Result<Criteria, CriteriaError> {
    let mut criteria = Criteria::default();

    for (log_name, rules) in def.criteria_per_log.0 {
        let mut compiled = Vec::with_capacity(rules.0.len());
        for (datum_key, raw) in rules.0 {
            let rule = compile_rule(&log_name, &datum_key, &raw)?;
            compiled.push(DatumRule { datum_key, rule });
        }
        criteria.per_log.insert(log_name, compiled);
    }

    criteria.tables = def
        .criteria_per_table
        .0
        .into_iter()
        .map(|(name, rows)| TableSpec {
            name,
            rows: rows
                .0
                .into_iter()
                .map(|(key, label)| RowSpec { key, label })
                .collect(),
        })
        .collect();

    for row in orphan_rows(&criteria) {
        tracing::warn!(row = %row, "Table row has no rule producing it; it will render empty");
    }

    tracing::debug!(
        logs = criteria.per_log.len(),
        rules = criteria.rule_count(),
        tables = criteria.tables.len(),
        "Criteria compiled"
    );

    Ok(criteria)
}

/// Compile one raw rule for `(log_name, datum_key)`.
pub fn compile_rule(
    log_name: &str,
    datum_key: &str,
    raw: &RawRule,
) -> Result<Rule, CriteriaError> {
    if raw.pattern.is_empty() {
        return Err(CriteriaError::MissingField {
            log_name: log_name.to_string(),
            datum_key: datum_key.to_string(),
            field: "pattern",
        });
    }

    if raw.pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(CriteriaError::RegexTooLong {
            log_name: log_name.to_string(),
            datum_key: datum_key.to_string(),
            length: raw.pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }

    let mode = resolve_mode(log_name, datum_key, raw)?;

    let pattern =
        compile_pattern(&raw.pattern, mode).map_err(|e| CriteriaError::InvalidRegex {
            log_name: log_name.to_string(),
            datum_key: datum_key.to_string(),
            pattern: raw.pattern.clone(),
            source: e,
        })?;

    if mode == ExtractMode::Dual {
        let groups = pattern.captures_len() - 1;
        if groups != constants::DUAL_CAPTURE_GROUPS {
            return Err(CriteriaError::CaptureGroups {
                log_name: log_name.to_string(),
                datum_key: datum_key.to_string(),
                expected: constants::DUAL_CAPTURE_GROUPS,
                found: groups,
            });
        }
    }

    Ok(Rule { pattern, mode })
}

/// Map the configured mode name (or the legacy flags) onto an `ExtractMode`.
fn resolve_mode(
    log_name: &str,
    datum_key: &str,
    raw: &RawRule,
) -> Result<ExtractMode, CriteriaError> {
    let name = match raw.mode.as_deref() {
        Some(mode) => mode.trim().to_ascii_lowercase(),
        None if raw.dual => "dual".to_string(),
        None if raw.average => "averaged".to_string(),
        None => "indexed".to_string(),
    };

    match name.as_str() {
        "single" | "indexed" => Ok(ExtractMode::Indexed { index: raw.index }),
        "averaged" | "average" => Ok(ExtractMode::Averaged {
            exponent: raw.exponent,
            round: raw.round,
        }),
        "dual" => Ok(ExtractMode::Dual),
        _ => Err(CriteriaError::UnsupportedMode {
            log_name: log_name.to_string(),
            datum_key: datum_key.to_string(),
            mode: raw.mode.clone().unwrap_or_default(),
        }),
    }
}

/// Table rows (as `table/row_key`) whose key no log rule produces.
pub fn orphan_rows(criteria: &Criteria) -> Vec<String> {
    let produced: BTreeSet<&str> = criteria
        .per_log
        .values()
        .flatten()
        .map(|r| r.datum_key.as_str())
        .collect();

    criteria
        .tables
        .iter()
        .flat_map(|table| {
            table
                .rows
                .iter()
                .filter(|row| !produced.contains(row.key.as_str()))
                .map(move |row| format!("{}/{}", table.name, row.key))
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_CRITERIA_JSON: &str = r#"{
        "criteria_per_log": {
            "sysinfo.log": {
                "kernel": {"pattern": "Kernel: (\\S+)", "mode": "single", "index": 0},
                "cpu_mhz": {"pattern": "MHz: (\\d+)", "mode": "averaged", "exponent": 0, "round": false},
                "disks": {"pattern": "Disk (\\w+).*?Size (\\d+)", "mode": "dual"}
            },
            "bench.log": {
                "latency": {"pattern": "lat=(\\d+)", "mode": "indexed", "index": -1}
            }
        },
        "criteria_per_table": {
            "system_info": {"kernel": "Kernel", "cpu_mhz": "CPU MHz", "disks": "Disks"},
            "benchmarks": {"latency": "Latency"}
        }
    }"#;

    fn path() -> PathBuf {
        PathBuf::from("criteria.json")
    }

    fn compile_json(json: &str) -> Result<Criteria, CriteriaError> {
        validate_and_compile(parse_criteria_json(json, &path())?)
    }

    #[test]
    fn test_compile_valid_criteria() {
        let criteria = compile_json(VALID_CRITERIA_JSON).unwrap();
        assert_eq!(criteria.rule_count(), 4);

        let sys = criteria.rules_for_log("sysinfo.log");
        let keys: Vec<_> = sys.iter().map(|r| r.datum_key.as_str()).collect();
        assert_eq!(keys, ["kernel", "cpu_mhz", "disks"]);
        assert_eq!(sys[0].rule.mode, ExtractMode::Indexed { index: 0 });
        assert_eq!(
            sys[1].rule.mode,
            ExtractMode::Averaged {
                exponent: 0,
                round: false
            }
        );
        assert_eq!(sys[2].rule.mode, ExtractMode::Dual);
    }

    #[test]
    fn test_table_and_row_order_follows_document() {
        let criteria = compile_json(VALID_CRITERIA_JSON).unwrap();
        let names: Vec<_> = criteria.tables.iter().map(|t| t.name.as_str()).collect();
        // "system_info" sorts after "benchmarks" but comes first in the file
        assert_eq!(names, ["system_info", "benchmarks"]);

        let labels: Vec<_> = criteria.tables[0]
            .rows
            .iter()
            .map(|r| r.label.as_str())
            .collect();
        assert_eq!(labels, ["Kernel", "CPU MHz", "Disks"]);
    }

    #[test]
    fn test_single_and_indexed_map_to_same_mode() {
        let criteria = compile_json(VALID_CRITERIA_JSON).unwrap();
        let single = &criteria.rules_for_log("sysinfo.log")[0].rule.mode;
        let indexed = &criteria.rules_for_log("bench.log")[0].rule.mode;
        assert!(matches!(single, ExtractMode::Indexed { .. }));
        assert!(matches!(indexed, ExtractMode::Indexed { index: -1 }));
    }

    #[test]
    fn test_legacy_rule_keys() {
        let json = r#"{
            "criteria_per_log": {
                "bench.log": {
                    "first": {"regex": "v=(\\d+)", "dual": false, "average": false, "idx": 1},
                    "mean": {"regex": "v=(\\d+)", "dual": false, "average": true, "exp": 3, "round": true},
                    "pairs": {"regex": "(\\w)=(\\d+)", "dual": true, "average": false}
                }
            },
            "criteria_per_table": {}
        }"#;
        let criteria = compile_json(json).unwrap();
        let rules = criteria.rules_for_log("bench.log");
        assert_eq!(rules[0].rule.mode, ExtractMode::Indexed { index: 1 });
        assert_eq!(
            rules[1].rule.mode,
            ExtractMode::Averaged {
                exponent: 3,
                round: true
            }
        );
        assert_eq!(rules[2].rule.mode, ExtractMode::Dual);
    }

    #[test]
    fn test_unsupported_mode_fails_fast() {
        let json = r#"{"criteria_per_log": {"a.log": {"x": {"pattern": "x", "mode": "median"}}}}"#;
        match compile_json(json).unwrap_err() {
            CriteriaError::UnsupportedMode {
                log_name,
                datum_key,
                mode,
            } => {
                assert_eq!(log_name, "a.log");
                assert_eq!(datum_key, "x");
                assert_eq!(mode, "median");
            }
            other => panic!("Expected UnsupportedMode, got: {other:?}"),
        }
    }

    #[test]
    fn test_missing_pattern() {
        let json = r#"{"criteria_per_log": {"a.log": {"x": {"mode": "single"}}}}"#;
        assert!(matches!(
            compile_json(json).unwrap_err(),
            CriteriaError::MissingField {
                field: "pattern",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_regex() {
        let json = r#"{"criteria_per_log": {"a.log": {"x": {"pattern": "[invalid"}}}}"#;
        assert!(matches!(
            compile_json(json).unwrap_err(),
            CriteriaError::InvalidRegex { .. }
        ));
    }

    #[test]
    fn test_regex_too_long() {
        let long_pattern = "a".repeat(constants::MAX_REGEX_PATTERN_LENGTH + 1);
        let json = format!(
            r#"{{"criteria_per_log": {{"a.log": {{"x": {{"pattern": "{long_pattern}"}}}}}}}}"#
        );
        assert!(matches!(
            compile_json(&json).unwrap_err(),
            CriteriaError::RegexTooLong { .. }
        ));
    }

    #[test]
    fn test_dual_requires_two_groups() {
        let json = r#"{"criteria_per_log": {"a.log": {"x": {"pattern": "(\\d+)", "mode": "dual"}}}}"#;
        match compile_json(json).unwrap_err() {
            CriteriaError::CaptureGroups {
                expected, found, ..
            } => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Expected CaptureGroups, got: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_criteria_json("{ not json", &path()).unwrap_err(),
            CriteriaError::JsonParse { .. }
        ));
    }

    #[test]
    fn test_parse_toml_criteria() {
        let toml = r#"
[criteria_per_log."dmesg.log".mem_total]
pattern = 'Memory: \d+K/(\d+)K'
mode = "single"

[criteria_per_log."dmesg.log".cpus]
pattern = 'smpboot: Total of (\d+) processors'

[criteria_per_table.hardware]
cpus = "CPUs"
mem_total = "Memory (KB)"
"#;
        let def = parse_criteria_toml(toml, Path::new("criteria.toml")).unwrap();
        let criteria = validate_and_compile(def).unwrap();
        assert_eq!(criteria.rules_for_log("dmesg.log").len(), 2);
        let keys: Vec<_> = criteria.tables[0]
            .rows
            .iter()
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(keys, ["cpus", "mem_total"]);
    }

    #[test]
    fn test_duplicate_key_keeps_first_position_last_value() {
        let json = r#"{"criteria_per_table": {"t": {"a": "A", "b": "B", "a": "A2"}}}"#;
        let criteria = compile_json(json).unwrap();
        let rows = &criteria.tables[0].rows;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "a");
        assert_eq!(rows[0].label, "A2");
    }

    #[test]
    fn test_orphan_rows_reported() {
        let json = r#"{
            "criteria_per_log": {"a.log": {"x": {"pattern": "x"}}},
            "criteria_per_table": {"t": {"x": "X", "y": "Y"}}
        }"#;
        let criteria = compile_json(json).unwrap();
        assert_eq!(orphan_rows(&criteria), vec!["t/y".to_string()]);
    }
}
