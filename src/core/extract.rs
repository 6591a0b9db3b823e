// LogGather - core/extract.rs
//
// Applies one extraction rule to one log text and produces one datum.
// Core layer: pure functions over strings, never touches the filesystem.
//
// Every failure mode here (no match, index out of range, non-numeric value
// in an averaged rule) resolves to an empty datum. Nothing in this module
// returns an error or panics; a bad cell must never abort the batch.

use crate::core::model::{ExtractMode, Rule};
use crate::util::constants;
use crate::util::logging::preview;
use regex::{Captures, Regex, RegexBuilder};

/// Compile `pattern` with the flags its extraction mode needs.
///
/// Dual-mode patterns pair values that may sit on different lines, so `.`
/// also matches `\n` for them.
pub fn compile_pattern(pattern: &str, mode: ExtractMode) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern)
        .dot_matches_new_line(matches!(mode, ExtractMode::Dual))
        .build()
}

/// Apply `rule` to the whole of `text` and return the formatted datum.
///
/// Returns an empty string when the rule finds nothing usable.
pub fn extract(rule: &Rule, text: &str) -> String {
    let datum = match rule.mode {
        ExtractMode::Indexed { index } => extract_indexed(&rule.pattern, index, text),
        ExtractMode::Averaged { exponent, round } => {
            extract_averaged(&rule.pattern, exponent, round, text)
        }
        ExtractMode::Dual => extract_dual(&rule.pattern, text),
    };

    if datum.is_empty() {
        tracing::trace!(
            pattern = %rule.pattern.as_str(),
            mode = %rule.mode,
            "Rule produced no datum"
        );
    }

    datum
}

/// The value a single match contributes: capture group 1 when the pattern
/// declares groups, otherwise the whole match.
fn match_value<'t>(caps: &Captures<'t>, grouped: bool) -> &'t str {
    let m = if grouped { caps.get(1) } else { caps.get(0) };
    m.map_or("", |m| m.as_str())
}

/// All match values in text order.
fn match_values<'t>(pattern: &Regex, text: &'t str) -> Vec<&'t str> {
    let grouped = pattern.captures_len() > 1;
    pattern
        .captures_iter(text)
        .map(|caps| match_value(&caps, grouped))
        .collect()
}

fn extract_indexed(pattern: &Regex, index: i64, text: &str) -> String {
    let values = match_values(pattern, text);
    let len = values.len() as i64;
    let position = if index < 0 { len + index } else { index };

    if !(0..len).contains(&position) {
        tracing::trace!(index, matches = len, "Index outside match list");
        return String::new();
    }

    values[position as usize].to_string()
}

fn extract_averaged(pattern: &Regex, exponent: i32, round: bool, text: &str) -> String {
    let divisor = 10f64.powi(exponent);
    let mut sum = 0.0;
    let mut count: usize = 0;

    for raw in match_values(pattern, text) {
        match raw.trim().parse::<f64>() {
            Ok(value) => {
                sum += value / divisor;
                count += 1;
            }
            Err(_) => {
                tracing::debug!(
                    value = preview(raw),
                    pattern = %pattern.as_str(),
                    "Non-numeric match in averaged rule; datum left empty"
                );
                return String::new();
            }
        }
    }

    if count == 0 {
        return String::new();
    }

    let mean = sum / count as f64;
    if round {
        format!("{mean:.prec$}", prec = constants::ROUNDED_DECIMALS)
    } else {
        format!("{mean:.0}")
    }
}

fn extract_dual(pattern: &Regex, text: &str) -> String {
    pattern
        .captures_iter(text)
        .map(|caps| {
            let first = caps.get(1).map_or("", |m| m.as_str());
            let second = caps.get(2).map_or("", |m| m.as_str());
            format!("{first} ({second})")
        })
        .collect::<Vec<_>>()
        .join(constants::DUAL_JOIN_SEPARATOR)
}

// =============================================================================
// Tests
// =============================================================================
