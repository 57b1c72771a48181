// LogScope - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// Every error keeps its cause reachable through `source()` for diagnostic
// logging; nothing is propagated as a bare string.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all LogScope operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogScopeError {
    /// A filter could not be built from the supplied query.
    Filter(FilterError),

    /// Reading the input sources failed.
    Ingest(IngestError),

    /// Export operation failed.
    Export(ExportError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Writing the report to its destination failed.
    Output(io::Error),
}

impl fmt::Display for LogScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Ingest(e) => write!(f, "Ingest error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Output(e) => write!(f, "Output error: {e}"),
        }
    }
}

impl std::error::Error for LogScopeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Filter(e) => Some(e),
            Self::Ingest(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Output(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Rule errors
// ---------------------------------------------------------------------------

/// Errors related to categorisation rule loading and validation.
#[derive(Debug)]
pub enum RuleError {
    /// TOML file could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Rules file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A rule pattern is not a valid regex.
    InvalidRegex {
        list: &'static str,
        pattern: String,
        source: regex::Error,
    },

    /// A rule pattern exceeds the maximum allowed length.
    RegexTooLong {
        list: &'static str,
        length: usize,
        max_length: usize,
    },

    /// A rule list holds more patterns than allowed.
    TooManyPatterns {
        list: &'static str,
        count: usize,
        max: usize,
    },

    /// I/O error reading a rules file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse rules '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Rules file '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::InvalidRegex {
                list,
                pattern,
                source,
            } => write!(f, "Invalid pattern in '{list}' rules ('{pattern}'): {source}"),
            Self::RegexTooLong {
                list,
                length,
                max_length,
            } => write!(
                f,
                "Pattern in '{list}' rules is {length} chars, exceeds maximum of {max_length}"
            ),
            Self::TooManyPatterns { list, count, max } => write!(
                f,
                "'{list}' rules hold {count} patterns, maximum is {max}"
            ),
            Self::Io { path, source } => {
                write!(f, "I/O error reading rules '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for RuleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors raised while building a filter, before any record is scanned.
#[derive(Debug)]
pub enum FilterError {
    /// User-provided regex is invalid.
    InvalidRegex {
        field: &'static str,
        pattern: String,
        source: regex::Error,
    },

    /// User-provided regex exceeds the maximum allowed length.
    RegexTooLong {
        field: &'static str,
        length: usize,
        max_length: usize,
    },

    /// A time bound could not be parsed (chronological comparison only).
    InvalidTimestamp {
        field: &'static str,
        value: String,
        format: &'static str,
    },

    /// The category name is not one of error, warn, info, misc.
    UnknownCategory { value: String },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex {
                field,
                pattern,
                source,
            } => write!(f, "Invalid {field} filter regex '{pattern}': {source}"),
            Self::RegexTooLong {
                field,
                length,
                max_length,
            } => write!(
                f,
                "{field} filter regex is {length} chars, exceeds maximum of {max_length}"
            ),
            Self::InvalidTimestamp {
                field,
                value,
                format,
            } => write!(
                f,
                "Cannot parse {field} '{value}' with format '{format}' (expected e.g. 'Jan 02 15:04:05')"
            ),
            Self::UnknownCategory { value } => write!(
                f,
                "Unknown category '{value}'. Expected one of: error, warn, info, misc"
            ),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FilterError> for LogScopeError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Ingest errors
// ---------------------------------------------------------------------------

/// Errors related to reading input sources.
#[derive(Debug)]
pub enum IngestError {
    /// A source path argument is not a valid glob pattern.
    InvalidGlob {
        pattern: String,
        source: glob::PatternError,
    },

    /// I/O error while reading a source.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGlob { pattern, source } => {
                write!(f, "Invalid source pattern '{pattern}': {source}")
            }
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGlob { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<IngestError> for LogScopeError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The output path has no recognised extension.
    UnsupportedFormat { path: PathBuf },

    /// Export would exceed maximum record count.
    TooManyRecords { count: usize, max: usize },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
            Self::UnsupportedFormat { path } => write!(
                f,
                "Cannot export to '{}': use a .csv or .json file name",
                path.display()
            ),
            Self::TooManyRecords { count, max } => write!(
                f,
                "Export of {count} records exceeds maximum of {max}. \
                 Apply filters to reduce the result set."
            ),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ExportError> for LogScopeError {
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

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
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
        }
    }
}

impl From<ConfigError> for LogScopeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for LogScope results.
pub type Result<T> = std::result::Result<T, LogScopeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_filter_error_chain_preserved() {
        let source = regex::Regex::new("[unclosed").unwrap_err();
        let err: LogScopeError = FilterError::InvalidRegex {
            field: "message",
            pattern: "[unclosed".to_string(),
            source,
        }
        .into();

        assert!(err.to_string().starts_with("Filter error: Invalid message filter regex"));
        let inner = err.source().expect("filter error as source");
        assert!(inner.source().is_some(), "regex error should be reachable");
    }

    #[test]
    fn test_unknown_category_message_lists_choices() {
        let err = FilterError::UnknownCategory {
            value: "fatal".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("'fatal'"));
        assert!(text.contains("error, warn, info, misc"));
    }

    #[test]
    fn test_every_top_level_variant_exposes_its_cause() {
        let errors: Vec<LogScopeError> = vec![
            FilterError::UnknownCategory {
                value: "x".to_string(),
            }
            .into(),
            IngestError::Io {
                path: PathBuf::from("a.log"),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .into(),
            ExportError::UnsupportedFormat {
                path: PathBuf::from("out.txt"),
            }
            .into(),
            ConfigError::Io {
                path: PathBuf::from("config.toml"),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            }
            .into(),
            LogScopeError::Output(io::Error::from(io::ErrorKind::BrokenPipe)),
        ];
        for err in &errors {
            assert!(err.source().is_some(), "{err} has no source");
        }
    }
}
