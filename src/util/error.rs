// LogGather - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation.
// All errors preserve the causal chain for diagnostic logging.
//
// Extraction misses are deliberately absent: they resolve to empty datums
// inside core::extract and never become errors.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogGather operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogGatherError {
    /// Criteria loading or validation failed.
    Criteria(CriteriaError),

    /// Source/log discovery failed.
    Discovery(DiscoveryError),

    /// Report or export output failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for LogGatherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Criteria(e) => write!(f, "Criteria error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for LogGatherError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Criteria(e) => Some(e),
            Self::Discovery(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Criteria errors
// ---------------------------------------------------------------------------

/// Errors related to criteria file loading and rule validation.
#[derive(Debug)]
pub enum CriteriaError {
    /// JSON criteria file could not be parsed.
    JsonParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// TOML criteria file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Criteria file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A rule is missing a required field or the field is empty.
    MissingField {
        log_name: String,
        datum_key: String,
        field: &'static str,
    },

    /// The rule names an extraction mode that does not exist.
    UnsupportedMode {
        log_name: String,
        datum_key: String,
        mode: String,
    },

    /// A rule pattern is not a valid regex.
    InvalidRegex {
        log_name: String,
        datum_key: String,
        pattern: String,
        source: regex::Error,
    },

    /// A rule pattern exceeds the maximum allowed length.
    RegexTooLong {
        log_name: String,
        datum_key: String,
        length: usize,
        max_length: usize,
    },

    /// The pattern declares the wrong number of capture groups for its mode.
    CaptureGroups {
        log_name: String,
        datum_key: String,
        expected: usize,
        found: usize,
    },

    /// I/O error reading a criteria file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for CriteriaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JsonParse { path, source } => {
                write!(f, "Failed to parse JSON '{}': {source}", path.display())
            }
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Criteria '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingField {
                log_name,
                datum_key,
                field,
            } => write!(
                f,
                "Rule '{log_name}/{datum_key}': missing required field '{field}'"
            ),
            Self::UnsupportedMode {
                log_name,
                datum_key,
                mode,
            } => write!(
                f,
                "Rule '{log_name}/{datum_key}': unsupported mode '{mode}'. \
                 Expected one of: single, indexed, averaged, dual"
            ),
            Self::InvalidRegex {
                log_name,
                datum_key,
                pattern,
                source,
            } => write!(
                f,
                "Rule '{log_name}/{datum_key}': invalid regex ('{pattern}'): {source}"
            ),
            Self::RegexTooLong {
                log_name,
                datum_key,
                length,
                max_length,
            } => write!(
                f,
                "Rule '{log_name}/{datum_key}': regex is {length} chars, \
                 exceeds maximum of {max_length}"
            ),
            Self::CaptureGroups {
                log_name,
                datum_key,
                expected,
                found,
            } => write!(
                f,
                "Rule '{log_name}/{datum_key}': pattern has {found} capture groups, \
                 dual mode requires exactly {expected}"
            ),
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error reading criteria '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for CriteriaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::JsonParse { source, .. } => Some(source),
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<CriteriaError> for LogGatherError {
    fn from(e: CriteriaError) -> Self {
        Self::Criteria(e)
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to source and log file discovery.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root scan path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Maximum file count exceeded during scan.
    MaxFilesExceeded { max: usize },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Scan path '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Scan path '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::MaxFilesExceeded { max } => {
                write!(
                    f,
                    "Discovery stopped: exceeded maximum of {max} files. \
                     Increase [discovery] max_files in config or narrow scan path."
                )
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for LogGatherError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing the report or an export.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Output I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for LogGatherError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogGatherError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogGather results.
pub type Result<T> = std::result::Result<T, LogGatherError>;

/// Render an error and its full `source()` chain on one line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        let cause_text = cause.to_string();
        // Display impls above already embed their direct source; skip repeats.
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        current = cause.source();
    }
    message
}
