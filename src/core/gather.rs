// LogGather - core/gather.rs
//
// Aggregation of extracted datums per source.
// Core layer: receives log text from the app layer, never reads files.

use crate::core::extract::extract;
use crate::core::model::{Criteria, Gathering};
use std::collections::BTreeMap;

impl Gathering {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure `source` has a column, even if none of its logs yield data.
    pub fn register_source(&mut self, source: &str) {
        self.sources.entry(source.to_string()).or_default();
    }

    /// Apply every rule keyed to `log_name` to `text` and store the datums
    /// under `source`.
    ///
    /// Unknown sources are created on first use. Recording the same log for
    /// the same source again overwrites that log's datum keys, so re-running
    /// on identical input leaves the gathering unchanged.
    ///
    /// Returns the number of datums written.
    pub fn record(&mut self, source: &str, log_name: &str, criteria: &Criteria, text: &str) -> usize {
        let rules = criteria.rules_for_log(log_name);
        let cells = self.sources.entry(source.to_string()).or_default();

        for datum_rule in rules {
            let datum = extract(&datum_rule.rule, text);
            tracing::trace!(
                source,
                log = log_name,
                datum = %datum_rule.datum_key,
                value = %datum,
                "Datum recorded"
            );
            cells.insert(datum_rule.datum_key.clone(), datum);
        }

        tracing::debug!(source, log = log_name, datums = rules.len(), "Log gathered");
        rules.len()
    }

    /// Source identifiers in ascending lexicographic order.
    pub fn sources(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    /// The datum for `(source, datum_key)`, if one was recorded.
    pub fn get(&self, source: &str, datum_key: &str) -> Option<&str> {
        self.sources
            .get(source)
            .and_then(|cells| cells.get(datum_key))
            .map(String::as_str)
    }

    /// All datums recorded for `source`.
    pub fn cells(&self, source: &str) -> Option<&BTreeMap<String, String>> {
        self.sources.get(source)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total number of recorded datums across every source.
    pub fn datum_count(&self) -> usize {
        self.sources.values().map(BTreeMap::len).sum()
    }

    /// Iterate `(source, datum_key, value)` in sorted order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.sources.iter().flat_map(|(source, cells)| {
            cells
                .iter()
                .map(move |(key, value)| (source.as_str(), key.as_str(), value.as_str()))
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::{parse_criteria_json, validate_and_compile};
    use std::path::Path;

    fn criteria() -> Criteria {
        let json = r#"{
            "criteria_per_log": {
                "log1": {
                    "avg_temp": {"pattern": "temp: (\\d+)", "mode": "averaged", "exponent": 0, "round": false},
                    "first_temp": {"pattern": "temp: (\\d+)", "mode": "single", "index": 0}
                },
                "log2": {
                    "host": {"pattern": "host=(\\w+)"}
                }
            }
        }"#;
        validate_and_compile(parse_criteria_json(json, Path::new("c.json")).unwrap()).unwrap()
    }

    #[test]
    fn test_record_stores_every_rule_of_the_log() {
        let c = criteria();
        let mut g = Gathering::new();
        let written = g.record("a", "log1", &c, "temp: 10\ntemp: 20\n");
        assert_eq!(written, 2);
        assert_eq!(g.get("a", "avg_temp"), Some("15"));
        assert_eq!(g.get("a", "first_temp"), Some("10"));
        assert_eq!(g.get("a", "host"), None);
    }

    #[test]
    fn test_record_unknown_log_still_creates_source() {
        let c = criteria();
        let mut g = Gathering::new();
        assert_eq!(g.record("b", "unrelated.log", &c, "temp: 1"), 0);
        assert_eq!(g.sources(), ["b"]);
        assert_eq!(g.datum_count(), 0);
    }

    #[test]
    fn test_record_is_idempotent() {
        let c = criteria();
        let mut once = Gathering::new();
        once.record("a", "log1", &c, "temp: 10\n");

        let mut twice = Gathering::new();
        twice.record("a", "log1", &c, "temp: 10\n");
        twice.record("a", "log1", &c, "temp: 10\n");

        assert_eq!(once, twice);
    }

    #[test]
    fn test_record_overwrites_only_that_logs_keys() {
        let c = criteria();
        let mut g = Gathering::new();
        g.record("a", "log2", &c, "host=alpha");
        g.record("a", "log1", &c, "temp: 10\n");
        g.record("a", "log1", &c, "temp: 40\n");
        assert_eq!(g.get("a", "avg_temp"), Some("40"));
        assert_eq!(g.get("a", "host"), Some("alpha"));
    }

    #[test]
    fn test_sources_sorted_regardless_of_record_order() {
        let c = criteria();
        let mut g = Gathering::new();
        g.record("zulu", "log1", &c, "");
        g.register_source("alpha");
        g.record("mike", "log1", &c, "");
        assert_eq!(g.sources(), ["alpha", "mike", "zulu"]);
    }

    #[test]
    fn test_register_source_keeps_existing_cells() {
        let c = criteria();
        let mut g = Gathering::new();
        g.record("a", "log2", &c, "host=alpha");
        g.register_source("a");
        assert_eq!(g.get("a", "host"), Some("alpha"));
    }

    #[test]
    fn test_iter_cells_in_sorted_order() {
        let c = criteria();
        let mut g = Gathering::new();
        g.record("b", "log2", &c, "host=beta");
        g.record("a", "log2", &c, "host=alpha");
        let cells: Vec<_> = g.iter_cells().collect();
        assert_eq!(cells, [("a", "host", "alpha"), ("b", "host", "beta")]);
    }
}
