// LogGather - core/discovery.rs
//
// Directory traversal that turns a root directory into sources and logs.
//
// Layout expected under the root:
//
//   root/
//     web-01/            <- source "web-01"
//       sysinfo.log      <- log "sysinfo.log" of web-01
//       bench/
//         disk.log       <- log "disk.log" of web-01
//     db-01/             <- source "db-01" (a column even if empty)
//     tables.org         <- files directly in root are not logs
//
// This module uses `walkdir` for traversal and reads only metadata, never
// file contents; that boundary is owned by the app layer.
//
// Per-entry I/O errors are non-fatal and collected as warnings. Exclude
// patterns without wildcards also prune directories of that name so they
// are never traversed.

use crate::core::model::DiscoveredLog;
use crate::util::constants;
use crate::util::error::DiscoveryError;
use std::path::{Path, PathBuf};

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a discovery operation.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth, counted from the root. Source
    /// directories are depth 1, so logs need a depth of at least 2.
    pub max_depth: usize,

    /// Maximum number of accepted files. Exceeding it is an error: a report
    /// silently built from part of the logs would be misleading.
    pub max_files: usize,

    /// Glob patterns (filename-only) that a file MUST match to be included.
    /// An empty list means "include everything that is not excluded".
    pub include_patterns: Vec<String>,

    /// Glob patterns matched against filenames AND directory component names.
    /// Matching files are skipped; matching directories are not descended into.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::DEFAULT_MAX_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            exclude_patterns: constants::DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Everything discovery found under a root.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Accepted log files, ordered by source then path.
    pub logs: Vec<DiscoveredLog>,

    /// Every source directory, sorted, including ones without logs.
    pub sources: Vec<String>,

    /// Non-fatal problems (unreadable entries, non-UTF-8 names).
    pub warnings: Vec<String>,
}

// =============================================================================
// Discovery
// =============================================================================

/// Discover sources and their log files under `root`.
///
/// `on_log_found` is called once per accepted log with the running count.
///
/// Returns `Err` only if the root path is invalid or `max_files` is
/// exceeded; everything else becomes a warning.
pub fn discover_logs<F>(
    root: &Path,
    config: &DiscoveryConfig,
    mut on_log_found: F,
) -> Result<Discovery, DiscoveryError>
where
    F: FnMut(&DiscoveredLog, usize),
{
    check_root(root)?;

    let max_files = config.max_files.min(constants::ABSOLUTE_MAX_FILES);
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);

    tracing::debug!(
        root = %root.display(),
        max_depth,
        max_files,
        include = ?config.include_patterns,
        exclude = ?config.exclude_patterns,
        "Discovery starting"
    );

    let include_pats = compile_patterns(&config.include_patterns, "include");
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut found = Discovery::default();

    // Discovery only reads, so symlinked sources and logs are followed.
    for entry_result in walk(root, max_depth, &exclude_pats, true) {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                found.warnings.push(access_warning(&e));
                continue;
            }
        };

        let depth = entry.depth();
        if depth == 0 {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            found.warnings.push(format!(
                "Skipping '{}': non-UTF-8 name",
                entry.path().display()
            ));
            continue;
        };

        if entry.file_type().is_dir() {
            if depth == 1 {
                found.sources.push(file_name);
            }
            continue;
        }

        if depth == 1 {
            tracing::trace!(file = %file_name, "Ignoring file outside any source directory");
            continue;
        }

        if is_excluded_filename(&file_name, &exclude_pats) {
            tracing::trace!(file = %file_name, "Excluded by pattern");
            continue;
        }
        if !is_included(&file_name, &include_pats) {
            tracing::trace!(file = %file_name, "Not matched by include patterns");
            continue;
        }

        let path = entry.path();
        let Some(source) = source_of(root, path) else {
            found.warnings.push(format!(
                "Skipping '{}': cannot resolve its source directory",
                path.display()
            ));
            continue;
        };

        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => {
                found.warnings.push(format!(
                    "Cannot read metadata for '{}': {e}",
                    path.display()
                ));
                continue;
            }
        };

        if found.logs.len() >= max_files {
            return Err(DiscoveryError::MaxFilesExceeded { max: max_files });
        }

        let log = DiscoveredLog {
            source,
            log_name: file_name,
            path: path.to_path_buf(),
            size,
        };
        on_log_found(&log, found.logs.len() + 1);
        found.logs.push(log);
    }

    found.sources.sort();
    found
        .logs
        .sort_by(|a, b| a.source.cmp(&b.source).then_with(|| a.path.cmp(&b.path)));

    tracing::debug!(
        sources = found.sources.len(),
        logs = found.logs.len(),
        warnings = found.warnings.len(),
        "Discovery complete"
    );

    Ok(found)
}

/// Find every file called exactly `file_name` anywhere under `root`.
///
/// Used by the masking pipeline, which rewrites files in place and does not
/// care about sources. Excluded directories are still pruned.
pub fn find_files_named(
    root: &Path,
    file_name: &str,
    config: &DiscoveryConfig,
) -> Result<(Vec<PathBuf>, Vec<String>), DiscoveryError> {
    check_root(root)?;

    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);
    let exclude_pats = compile_patterns(&config.exclude_patterns, "exclude");

    let mut files = Vec::new();
    let mut warnings = Vec::new();

    // Masking rewrites files; never write through a link.
    for entry_result in walk(root, max_depth, &exclude_pats, false) {
        match entry_result {
            Ok(entry) => {
                if entry.file_type().is_file() && entry.file_name().to_str() == Some(file_name) {
                    files.push(entry.into_path());
                }
            }
            Err(e) => warnings.push(access_warning(&e)),
        }
    }

    tracing::debug!(
        root = %root.display(),
        file_name,
        found = files.len(),
        "File search complete"
    );

    Ok((files, warnings))
}

// =============================================================================
// Helpers
// =============================================================================

/// Pre-flight validation of the root path.
///
/// Uses `fs::metadata()` rather than `Path::is_dir()` so that access-denied
/// can be told apart from a path that does not exist.
fn check_root(root: &Path) -> Result<(), DiscoveryError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        }),
    }
}

/// Sorted walk of `root` that never descends into excluded directories.
///
/// With `follow_links`, a symlink reports the type of its target and link
/// loops surface as walk errors.
fn walk<'a>(
    root: &Path,
    max_depth: usize,
    exclude_pats: &'a [glob::Pattern],
    follow_links: bool,
) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> + 'a {
    walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_str().unwrap_or("");
            !is_excluded_component(name, exclude_pats)
        })
}

/// Name of the first directory under `root` on the way to `path`.
fn source_of(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()?
        .components()
        .next()?
        .as_os_str()
        .to_str()
        .map(str::to_string)
}

fn access_warning(e: &walkdir::Error) -> String {
    let path_str = e
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_string());
    let msg = format!("Cannot access '{path_str}': {e}");
    tracing::debug!(warning = %msg, "Discovery warning");
    msg
}

/// Compile a list of glob pattern strings into `glob::Pattern` objects.
/// Patterns that fail to compile are logged as warnings and skipped.
fn compile_patterns(patterns: &[String], kind: &str) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, kind, error = %e, "Invalid glob pattern, skipping");
                None
            }
        })
        .collect()
}

/// Returns true if `dir_name` matches any exclude pattern that contains no
/// wildcard characters. These are treated as directory component exclusions
/// (e.g. ".git") rather than filename glob patterns.
fn is_excluded_component(dir_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| {
        let s = p.as_str();
        !s.contains('*') && !s.contains('?') && !s.contains('[') && p.matches(dir_name)
    })
}

/// Returns true if `file_name` matches any exclude pattern (wildcard or literal).
fn is_excluded_filename(file_name: &str, exclude_pats: &[glob::Pattern]) -> bool {
    exclude_pats.iter().any(|p| p.matches(file_name))
}

/// Returns true if `file_name` matches at least one include pattern.
/// An empty include list means "include all" (returns true).
fn is_included(file_name: &str, include_pats: &[glob::Pattern]) -> bool {
    if include_pats.is_empty() {
        return true;
    }
    include_pats.iter().any(|p| p.matches(file_name))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_temp_tree() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();

        let web = root.join("web-01");
        fs::create_dir(&web).expect("mkdir web-01");
        fs::write(web.join("sysinfo.log"), "Kernel: 5.10\n").expect("write sysinfo");
        fs::write(web.join("old.log.gz"), "binary").expect("write gz");
        let bench = web.join("bench");
        fs::create_dir(&bench).expect("mkdir bench");
        fs::write(bench.join("disk.log"), "read 100\n").expect("write disk.log");

        let db = root.join("db-01");
        fs::create_dir(&db).expect("mkdir db-01");
        fs::write(db.join("sysinfo.log"), "Kernel: 6.1\n").expect("write sysinfo");

        fs::create_dir(root.join("empty-02")).expect("mkdir empty-02");

        let git = root.join("web-01").join(".git");
        fs::create_dir(&git).expect("mkdir .git");
        fs::write(git.join("HEAD"), "ref").expect("write HEAD");

        fs::write(root.join("tables.org"), "previous report").expect("write report");

        dir
    }

    fn names(found: &Discovery) -> Vec<(String, String)> {
        found
            .logs
            .iter()
            .map(|l| (l.source.clone(), l.log_name.clone()))
            .collect()
    }

    #[test]
    fn test_discovers_sources_and_logs() {
        let dir = make_temp_tree();
        let found = discover_logs(dir.path(), &DiscoveryConfig::default(), |_, _| {}).unwrap();

        assert_eq!(found.sources, ["db-01", "empty-02", "web-01"]);
        assert_eq!(
            names(&found),
            [
                ("db-01".to_string(), "sysinfo.log".to_string()),
                ("web-01".to_string(), "disk.log".to_string()),
                ("web-01".to_string(), "sysinfo.log".to_string()),
            ]
        );
        assert!(found.warnings.is_empty(), "unexpected warnings: {:?}", found.warnings);
    }

    #[test]
    fn test_root_files_are_not_logs() {
        let dir = make_temp_tree();
        let found = discover_logs(dir.path(), &DiscoveryConfig::default(), |_, _| {}).unwrap();
        assert!(found.logs.iter().all(|l| l.log_name != "tables.org"));
    }

    #[test]
    fn test_excluded_directory_not_descended() {
        let dir = make_temp_tree();
        let found = discover_logs(dir.path(), &DiscoveryConfig::default(), |_, _| {}).unwrap();
        assert!(found.logs.iter().all(|l| l.log_name != "HEAD"));
    }

    #[test]
    fn test_include_patterns_filter_logs() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            include_patterns: vec!["sys*".to_string()],
            ..Default::default()
        };
        let found = discover_logs(dir.path(), &config, |_, _| {}).unwrap();
        assert_eq!(found.logs.len(), 2);
        assert!(found.logs.iter().all(|l| l.log_name == "sysinfo.log"));
    }

    #[test]
    fn test_max_depth_limits_nested_logs() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_depth: 2,
            ..Default::default()
        };
        let found = discover_logs(dir.path(), &config, |_, _| {}).unwrap();
        assert!(found.logs.iter().all(|l| l.log_name != "disk.log"));
        assert_eq!(found.sources.len(), 3);
    }

    #[test]
    fn test_max_files_exceeded_is_an_error() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_files: 2,
            ..Default::default()
        };
        let result = discover_logs(dir.path(), &config, |_, _| {});
        assert!(matches!(
            result,
            Err(DiscoveryError::MaxFilesExceeded { max: 2 })
        ));
    }

    #[test]
    fn test_callback_called_for_each_log() {
        let dir = make_temp_tree();
        let mut calls = 0usize;
        let found = discover_logs(dir.path(), &DiscoveryConfig::default(), |_, _| {
            calls += 1;
        })
        .unwrap();
        assert_eq!(calls, found.logs.len());
    }

    #[test]
    fn test_root_not_found() {
        let result = discover_logs(
            Path::new("/nonexistent/path/loggather"),
            &DiscoveryConfig::default(),
            |_, _| {},
        );
        assert!(matches!(result, Err(DiscoveryError::RootNotFound { .. })));
    }

    #[test]
    fn test_root_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir.log");
        fs::write(&file, "content").unwrap();
        let result = discover_logs(&file, &DiscoveryConfig::default(), |_, _| {});
        assert!(matches!(result, Err(DiscoveryError::NotADirectory { .. })));
    }

    #[test]
    fn test_find_files_named() {
        let dir = make_temp_tree();
        let (files, warnings) =
            find_files_named(dir.path(), "sysinfo.log", &DiscoveryConfig::default()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.ends_with("sysinfo.log")));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_log_size_collected() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("alpha");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("meta.log"), "hello world").unwrap();
        let found = discover_logs(dir.path(), &DiscoveryConfig::default(), |_, _| {}).unwrap();
        assert_eq!(found.logs.len(), 1);
        assert_eq!(found.logs[0].size, 11);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_source_directory_is_a_source() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("sensors.log"), "temp: 10\n").unwrap();
        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&target, root.join("delta")).unwrap();

        let found = discover_logs(&root, &DiscoveryConfig::default(), |_, _| {}).unwrap();
        assert_eq!(found.sources, ["delta"]);
        assert_eq!(found.logs.len(), 1);
        assert_eq!(found.logs[0].source, "delta");
        assert_eq!(found.logs[0].path, root.join("delta").join("sensors.log"));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_files_named_skips_symlinked_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("alpha");
        fs::create_dir(&src).unwrap();
        fs::write(dir.path().join("outside"), "x").unwrap();
        std::os::unix::fs::symlink(dir.path().join("outside"), src.join("messages")).unwrap();

        let (files, _) =
            find_files_named(dir.path(), "messages", &DiscoveryConfig::default()).unwrap();
        assert!(files.is_empty());
    }
}
