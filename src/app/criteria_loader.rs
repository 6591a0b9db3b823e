// LogGather - app/criteria_loader.rs
//
// Reads a criteria file from disk and hands its content to core::criteria.
// The format follows the extension: `.toml` is TOML, anything else is JSON
// (the historical criteria.json format).

use crate::core::criteria;
use crate::core::model::Criteria;
use crate::util::constants;
use crate::util::error::CriteriaError;
use std::path::Path;

/// Load, parse and validate the criteria file at `path`.
///
/// Any problem is fatal: running with a half-understood rule set would fill
/// the report with blank cells and no explanation.
pub fn load_criteria_file(path: &Path) -> Result<Criteria, CriteriaError> {
    let metadata = std::fs::metadata(path).map_err(|e| CriteriaError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.len() > constants::MAX_CRITERIA_FILE_SIZE {
        return Err(CriteriaError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_CRITERIA_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| CriteriaError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let is_toml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"));

    let def = if is_toml {
        criteria::parse_criteria_toml(&content, path)?
    } else {
        criteria::parse_criteria_json(&content, path)?
    };

    let compiled = criteria::validate_and_compile(def)?;

    tracing::info!(
        path = %path.display(),
        logs = compiled.per_log.len(),
        rules = compiled.rule_count(),
        tables = compiled.tables.len(),
        "Criteria loaded"
    );

    Ok(compiled)
}
