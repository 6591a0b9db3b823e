// LogGather - platform/fs.rs
//
// Filesystem helpers used by the app layer. Core never calls these.

use std::io;
use std::path::{Path, PathBuf};

/// Read the full content of a file as a string.
///
/// Log files are not always valid UTF-8 (binary garbage, legacy encodings);
/// invalid sequences are replaced rather than failing the whole file.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Replace the content of `path` with `content`.
///
/// Writes a sibling temporary file first and renames it over the target, so
/// an interrupted run never leaves a half-written report or log behind.
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let tmp = temp_sibling(path);
    std::fs::write(&tmp, content)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.loggather-tmp"))
}
