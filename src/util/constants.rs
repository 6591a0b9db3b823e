// LogGather - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogGather";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "LogGather";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Discovery limits
// =============================================================================

/// Maximum directory recursion depth during discovery.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Minimum sensible value for the max-files limit (controls must be non-zero).
pub const MIN_MAX_FILES: usize = 1;

/// Maximum number of log files to gather from in a single run.
pub const DEFAULT_MAX_FILES: usize = 2_000;

/// Hard upper bound on max files (prevents configuration mistakes).
pub const ABSOLUTE_MAX_FILES: usize = 50_000;

/// Hard upper bound on max depth (prevents infinite traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Default include glob patterns. Empty means every file is a candidate log.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &[];

/// Default exclude glob patterns for log file discovery.
///
/// Literal entries (no wildcard) also prune directories of that name.
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*.gz", "*.zip", "*.bak", "*.tmp", ".git"];

// =============================================================================
// Criteria limits
// =============================================================================

/// Maximum size of a criteria file in bytes.
pub const MAX_CRITERIA_FILE_SIZE: u64 = 1024 * 1024; // 1 MB

/// Maximum regex pattern length to prevent ReDoS.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

/// Number of capture groups a dual-mode pattern must declare.
pub const DUAL_CAPTURE_GROUPS: usize = 2;

/// Default criteria file, relative to the working directory.
pub const DEFAULT_CRITERIA_FILE: &str = "./criteria.json";

// =============================================================================
// Report layout
// =============================================================================

/// Width of the `=` rule printed under each table title.
pub const TITLE_RULE_WIDTH: usize = 79;

/// Horizontal divider line used above and below header and body rows.
pub const TABLE_DIVIDER: &str = "|-";

/// Separator between cells of a table row.
pub const CELL_SEPARATOR: &str = " | ";

/// Separator between the entries of a dual-mode datum.
pub const DUAL_JOIN_SEPARATOR: &str = ", ";

/// Decimal digits used when an averaged rule asks for rounding.
pub const ROUNDED_DECIMALS: usize = 3;

/// Platform line terminator used when joining report lines.
pub const LINE_ENDING: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Default report file name, written into the gathered root directory.
pub const DEFAULT_OUTPUT_FILE_NAME: &str = "tables.org";

/// Accepted report formats; the first entry is the default.
pub const OUTPUT_FORMATS: &[&str] = &["org", "csv", "json"];

// =============================================================================
// IP masking
// =============================================================================

/// Replacement for a public IPv4 address.
pub const IPV4_MASK: &str = "x.x.x.x";

/// Replacement for a public IPv6 address.
pub const IPV6_MASK: &str = "::x";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a text preview included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
