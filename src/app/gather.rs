// LogGather - app/gather.rs
//
// The gathering pipeline: discovery -> read -> record -> render -> write.
//
// Runs sequentially on the caller's thread, one file in memory at a time.
// Per-file read errors are non-fatal: the log contributes nothing and the
// problem is reported as a warning, so one unreadable file never costs the
// whole report.

use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::export;
use crate::core::model::{Criteria, Gathering, OutputFormat};
use crate::core::render;
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::{DiscoveryError, ExportError};
use std::path::Path;

/// Outcome of a gathering run.
#[derive(Debug, Default)]
pub struct GatherReport {
    pub gathering: Gathering,
    /// Logs that had rules and were read successfully.
    pub logs_read: usize,
    /// Logs found but not named in the criteria.
    pub logs_skipped: usize,
    /// Total size of the logs read, as seen at discovery.
    pub bytes_read: u64,
    /// Non-fatal problems from discovery and reading.
    pub warnings: Vec<String>,
}

/// Build the discovery configuration from validated app config.
pub fn discovery_config(config: &AppConfig) -> DiscoveryConfig {
    DiscoveryConfig {
        max_depth: config.max_depth,
        max_files: config.max_files,
        include_patterns: config.include_patterns.clone(),
        exclude_patterns: config.exclude_patterns.clone(),
    }
}

/// Gather every configured datum from every source under `root`.
pub fn run_gather(
    root: &Path,
    criteria: &Criteria,
    config: &DiscoveryConfig,
) -> Result<GatherReport, DiscoveryError> {
    let found = discovery::discover_logs(root, config, |log, count| {
        tracing::trace!(
            source = %log.source,
            log = %log.log_name,
            size = log.size,
            count,
            "Log discovered"
        );
    })?;

    let mut report = GatherReport {
        warnings: found.warnings,
        ..Default::default()
    };

    for source in &found.sources {
        report.gathering.register_source(source);
    }

    for log in &found.logs {
        if !criteria.wants_log(&log.log_name) {
            report.logs_skipped += 1;
            continue;
        }

        let text = match fs::read_file_lossy(&log.path) {
            Ok(t) => t,
            Err(e) => {
                let msg = format!("Cannot read '{}': {e}", log.path.display());
                tracing::warn!(warning = %msg, "Log skipped");
                report.warnings.push(msg);
                continue;
            }
        };

        report
            .gathering
            .record(&log.source, &log.log_name, criteria, &text);
        report.logs_read += 1;
        report.bytes_read += log.size;
    }

    tracing::info!(
        sources = found.sources.len(),
        logs_read = report.logs_read,
        logs_skipped = report.logs_skipped,
        bytes_read = report.bytes_read,
        datums = report.gathering.datum_count(),
        warnings = report.warnings.len(),
        "Gathering complete"
    );

    Ok(report)
}

/// Serialise the gathering in the requested format.
///
/// `output_path` only labels errors; nothing is written here.
pub fn render_report(
    gathering: &Gathering,
    criteria: &Criteria,
    format: OutputFormat,
    output_path: &Path,
) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Org => return Ok(render::render(&criteria.tables, gathering).into_bytes()),
        OutputFormat::Csv => {
            export::export_csv(gathering, &mut buf, output_path)?;
        }
        OutputFormat::Json => {
            export::export_json(gathering, &mut buf, output_path)?;
        }
    }
    Ok(buf)
}

/// Write the rendered report to `output_path`.
pub fn write_report(output_path: &Path, content: &[u8]) -> Result<(), ExportError> {
    fs::write_atomic(output_path, content).map_err(|e| ExportError::Io {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    tracing::info!(path = %output_path.display(), bytes = content.len(), "Report written");
    Ok(())
}
