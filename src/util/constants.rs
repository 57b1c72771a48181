// LogScope - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "LogScope";

/// Application identifier used for config directories.
pub const APP_ID: &str = "LogScope";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Parsing
// =============================================================================

/// chrono format of the canonical record timestamp ("Jan 02 15:04:05").
pub const TIMESTAMP_FORMAT: &str = "%b %d %H:%M:%S";

/// Year injected into year-less syslog timestamps.
///
/// A leap year, so that `Feb 29` lines are not rejected.
pub const PLACEHOLDER_YEAR: i32 = 2000;

/// Maximum length of a rejected line included in trace output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Rules
// =============================================================================

/// Maximum size of a rules TOML file in bytes.
pub const MAX_RULES_FILE_SIZE: u64 = 64 * 1024; // 64 KB

/// Maximum regex pattern length to prevent ReDoS (rules and filters alike).
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

/// Maximum number of patterns in a single rule list.
pub const MAX_PATTERNS_PER_RULE: usize = 256;

// =============================================================================
// Query defaults
// =============================================================================

/// Default number of entries in the top-processes table.
pub const DEFAULT_TOP_N: usize = 5;

/// Upper bound for the configurable top-N size.
pub const MAX_TOP_N: usize = 100;

/// Default number of trend buckets.
pub const DEFAULT_TREND_BUCKETS: usize = 5;

/// Upper bound for the configurable trend bucket count.
pub const MAX_TREND_BUCKETS: usize = 500;

/// Default number of rows printed by the report.
pub const DEFAULT_ROW_LIMIT: usize = 200;

/// Upper bound for the configurable row limit.
pub const MAX_ROW_LIMIT: usize = 1_000_000;

/// Width of the bar drawn for the largest value in the report charts.
pub const REPORT_BAR_WIDTH: usize = 40;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Export
// =============================================================================

/// Maximum number of records that can be exported in a single operation.
pub const MAX_EXPORT_RECORDS: usize = 5_000_000;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default user rules file name, looked up next to config.toml.
pub const RULES_FILE_NAME: &str = "rules.toml";
