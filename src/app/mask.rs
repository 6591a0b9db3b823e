// LogGather - app/mask.rs
//
// Masking pipeline: find every file with a given name under the root and
// rewrite it with its public IP addresses replaced.
//
// Unlike gathering, a file that cannot be read or written stops the run.
// A partially masked tree is worse than an unmasked one because it looks done.

use crate::core::discovery::{self, DiscoveryConfig};
use crate::core::mask;
use crate::platform::fs;
use crate::util::error::LogGatherError;
use std::path::{Path, PathBuf};

/// Outcome of a masking run.
#[derive(Debug, Default)]
pub struct MaskReport {
    /// Files whose content changed and was written back.
    pub rewritten: Vec<PathBuf>,
    /// Files that contained no public address.
    pub unchanged: usize,
    /// Non-fatal problems from the directory walk.
    pub warnings: Vec<String>,
}

/// Mask public IPs in every file called `file_name` under `root`.
pub fn run_mask(
    root: &Path,
    file_name: &str,
    config: &DiscoveryConfig,
) -> Result<MaskReport, LogGatherError> {
    let (files, warnings) = discovery::find_files_named(root, file_name, config)?;

    let mut report = MaskReport {
        warnings,
        ..Default::default()
    };

    for path in files {
        let original = fs::read_file_lossy(&path).map_err(|e| LogGatherError::Io {
            path: path.clone(),
            operation: "read",
            source: e,
        })?;

        let masked = mask::mask_ips(&original);
        if masked == original {
            tracing::debug!(path = %path.display(), "Nothing to mask");
            report.unchanged += 1;
            continue;
        }

        fs::write_atomic(&path, masked.as_bytes()).map_err(|e| LogGatherError::Io {
            path: path.clone(),
            operation: "write",
            source: e,
        })?;
        tracing::info!(path = %path.display(), "Masked");
        report.rewritten.push(path);
    }

    tracing::info!(
        file_name,
        rewritten = report.rewritten.len(),
        unchanged = report.unchanged,
        "Masking complete"
    );

    Ok(report)
}
