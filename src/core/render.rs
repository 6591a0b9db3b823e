// LogGather - core/render.rs
//
// Plain-text (org-mode) table rendering of a completed gathering.
//
// Layout per table:
//
//   TABLE NAME
//   ===============...   (79 '=')
//   |-
//   |  | Alpha | Beta |
//   |-
//   | Row Label | 15 | 30 |
//   |-
//   <blank>
//
// Columns are the gathering's sources in sorted order. Downstream tools
// parse this layout, so any change here is a format change.

use crate::core::model::{Gathering, TableSpec};
use crate::util::constants;

/// Render every table of `tables`, in the given order, from `gathering`.
pub fn render(tables: &[TableSpec], gathering: &Gathering) -> String {
    let sources = gathering.sources();
    let mut lines: Vec<String> = Vec::new();

    for table in tables {
        lines.push(table_title(&table.name));
        lines.push("=".repeat(constants::TITLE_RULE_WIDTH));

        lines.push(constants::TABLE_DIVIDER.to_string());
        let header = std::iter::once(String::new())
            .chain(sources.iter().map(|s| title_case(s)))
            .collect::<Vec<_>>();
        lines.push(table_row(&header));
        lines.push(constants::TABLE_DIVIDER.to_string());

        for row in &table.rows {
            let cells = std::iter::once(row.label.clone())
                .chain(
                    sources
                        .iter()
                        .map(|source| gathering.get(source, &row.key).unwrap_or("").to_string()),
                )
                .collect::<Vec<_>>();
            lines.push(table_row(&cells));
        }

        lines.push(constants::TABLE_DIVIDER.to_string());
        lines.push(String::new());

        tracing::debug!(
            table = %table.name,
            rows = table.rows.len(),
            columns = sources.len(),
            "Table rendered"
        );
    }

    lines.join(constants::LINE_ENDING)
}

/// `disk_usage` -> `DISK USAGE`.
fn table_title(name: &str) -> String {
    name.to_uppercase().replace('_', " ")
}

/// Pipe-delimited row: `| c1 | c2 | c3 |`.
fn table_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(constants::CELL_SEPARATOR))
}

/// Title-case an identifier: the first letter of every run of letters is
/// upper-cased, the rest lower-cased. Digits and punctuation break runs, so
/// `web-01a` becomes `Web-01A`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::criteria::{parse_criteria_json, validate_and_compile};
    use crate::core::model::{Criteria, RowSpec};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn temps_criteria() -> Criteria {
        let json = r#"{
            "criteria_per_log": {
                "log1": {
                    "avg_temp": {"pattern": "temp: (\\d+)", "mode": "averaged", "exponent": 0, "round": false}
                }
            },
            "criteria_per_table": {"temps": {"avg_temp": "Avg Temp"}}
        }"#;
        validate_and_compile(parse_criteria_json(json, Path::new("c.json")).unwrap()).unwrap()
    }

    fn table(name: &str, rows: &[(&str, &str)]) -> TableSpec {
        TableSpec {
            name: name.to_string(),
            rows: rows
                .iter()
                .map(|(key, label)| RowSpec {
                    key: key.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        }
    }

    fn lines(text: &str) -> Vec<&str> {
        text.split(constants::LINE_ENDING).collect()
    }

    #[test]
    fn test_render_end_to_end_layout() {
        let criteria = temps_criteria();
        let mut g = Gathering::new();
        g.record("b", "log1", &criteria, "temp: 30\n");
        g.record("a", "log1", &criteria, "temp: 10\ntemp: 20\n");

        let out = render(&criteria.tables, &g);
        let expected = [
            "TEMPS".to_string(),
            "=".repeat(79),
            "|-".to_string(),
            "|  | A | B |".to_string(),
            "|-".to_string(),
            "| Avg Temp | 15 | 30 |".to_string(),
            "|-".to_string(),
            String::new(),
        ]
        .join(constants::LINE_ENDING);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_title_rule_is_79_equals() {
        let out = render(&[table("t", &[])], &Gathering::new());
        assert_eq!(lines(&out)[1], "=".repeat(79));
    }

    #[test]
    fn test_title_upper_cases_and_replaces_underscores() {
        let out = render(&[table("disk_usage_root", &[])], &Gathering::new());
        assert_eq!(lines(&out)[0], "DISK USAGE ROOT");
    }

    #[test]
    fn test_missing_cell_renders_empty_and_keeps_column_count() {
        let criteria = temps_criteria();
        let mut g = Gathering::new();
        g.record("a", "log1", &criteria, "temp: 10\n");
        g.register_source("b");
        g.register_source("c");

        let out = render(&criteria.tables, &g);
        let row = lines(&out)[5];
        assert_eq!(row, "| Avg Temp | 10 |  |  |");
        // label + one cell per source
        assert_eq!(row.trim_matches('|').split(" | ").count(), 1 + 3);
    }

    #[test]
    fn test_tables_keep_configured_order() {
        let g = Gathering::new();
        let out = render(&[table("zeta", &[]), table("alpha", &[])], &g);
        let titles: Vec<_> = lines(&out)
            .into_iter()
            .filter(|l| *l == "ZETA" || *l == "ALPHA")
            .collect();
        assert_eq!(titles, ["ZETA", "ALPHA"]);
    }

    #[test]
    fn test_rows_keep_configured_order() {
        let g = Gathering::new();
        let out = render(&[table("t", &[("z", "Zed"), ("a", "Ay")])], &g);
        let ls = lines(&out);
        assert_eq!(ls[5], "| Zed |");
        assert_eq!(ls[6], "| Ay |");
    }

    #[test]
    fn test_tables_separated_by_blank_line() {
        let g = Gathering::new();
        let out = render(&[table("one", &[]), table("two", &[])], &g);
        let ls = lines(&out);
        assert_eq!(ls[5], "|-");
        assert_eq!(ls[6], "");
        assert_eq!(ls[7], "TWO");
    }

    #[test]
    fn test_no_tables_renders_nothing() {
        assert_eq!(render(&[], &Gathering::new()), "");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("server-01"), "Server-01");
        assert_eq!(title_case("web_a"), "Web_A");
        assert_eq!(title_case("db1x"), "Db1X");
        assert_eq!(title_case("VPS one"), "Vps One");
        assert_eq!(title_case(""), "");
    }
}
