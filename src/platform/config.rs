// LogScope - platform/config.rs
//
// Config directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::filter::TimeComparison;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for LogScope configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/logscope/ or %APPDATA%\LogScope\config\)
    pub config_dir: PathBuf,

    /// Default config file inside `config_dir`.
    pub config_file: PathBuf,

    /// Default user rules file inside `config_dir`.
    pub rules_file: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        let config_dir = match ProjectDirs::from("", "", constants::APP_ID) {
            Some(proj_dirs) => proj_dirs.config_dir().to_path_buf(),
            None => {
                tracing::warn!("Could not determine platform directories, using current directory");
                PathBuf::from(".")
            }
        };

        let paths = Self::in_dir(config_dir);
        tracing::debug!(
            config = %paths.config_file.display(),
            rules = %paths.rules_file.display(),
            "Platform paths resolved"
        );
        paths
    }

    /// Paths rooted at an explicit directory.
    pub fn in_dir(config_dir: PathBuf) -> Self {
        Self {
            config_file: config_dir.join(constants::CONFIG_FILE_NAME),
            rules_file: config_dir.join(constants::RULES_FILE_NAME),
            config_dir,
        }
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[query]` section.
    pub query: QuerySection,
    /// `[rules]` section.
    pub rules: RulesSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
}

/// `[query]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct QuerySection {
    /// Size of the top-processes table.
    pub top_n: Option<usize>,
    /// Number of trend buckets.
    pub trend_buckets: Option<usize>,
    /// "lexical" or "chronological".
    pub time_comparison: Option<String>,
    /// Maximum rows printed by the report.
    pub row_limit: Option<usize>,
}

/// `[rules]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RulesSection {
    /// Rules file replacing the built-in table.
    pub file: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub top_n: usize,
    pub trend_buckets: usize,
    pub time_comparison: TimeComparison,
    pub row_limit: usize,
    pub rules_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            top_n: constants::DEFAULT_TOP_N,
            trend_buckets: constants::DEFAULT_TREND_BUCKETS,
            time_comparison: TimeComparison::default(),
            row_limit: constants::DEFAULT_ROW_LIMIT,
            rules_file: None,
            log_level: None,
        }
    }
}

/// Load and validate a config file.
///
/// When `required` is false (the implicit platform config) a missing file
/// yields defaults and an unreadable or unparseable one yields defaults plus
/// a warning. When `required` is true (an explicit `--config`) those cases
/// are errors.
pub fn load_config(
    config_path: &Path,
    required: bool,
) -> Result<(AppConfig, Vec<String>), ConfigError> {
    if !required && !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return Ok((AppConfig::default(), Vec::new()));
    }

    let loaded = std::fs::read_to_string(config_path)
        .map_err(|e| ConfigError::Io {
            path: config_path.to_path_buf(),
            source: e,
        })
        .and_then(|content| parse_config(&content, config_path));

    match loaded {
        Ok(result) => {
            tracing::info!(path = %config_path.display(), "Loaded config.toml");
            Ok(result)
        }
        Err(e) if !required => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            Ok((AppConfig::default(), vec![msg]))
        }
        Err(e) => Err(e),
    }
}

/// Parse config TOML text and validate each field against named constants,
/// accumulating a warning for every rejected value.
///
/// `source_path` is used for error messages and to resolve a relative
/// rules file path.
pub fn parse_config(
    content: &str,
    source_path: &Path,
) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })?;

    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Query: top_n --
    if let Some(n) = raw.query.top_n {
        if (1..=constants::MAX_TOP_N).contains(&n) {
            config.top_n = n;
        } else {
            warnings.push(format!(
                "[query] top_n = {n} is out of range (1-{}). Using default ({}).",
                constants::MAX_TOP_N,
                constants::DEFAULT_TOP_N,
            ));
        }
    }

    // -- Query: trend_buckets --
    if let Some(n) = raw.query.trend_buckets {
        if (1..=constants::MAX_TREND_BUCKETS).contains(&n) {
            config.trend_buckets = n;
        } else {
            warnings.push(format!(
                "[query] trend_buckets = {n} is out of range (1-{}). Using default ({}).",
                constants::MAX_TREND_BUCKETS,
                constants::DEFAULT_TREND_BUCKETS,
            ));
        }
    }

    // -- Query: time_comparison --
    if let Some(ref mode) = raw.query.time_comparison {
        match mode.to_lowercase().as_str() {
            "lexical" => config.time_comparison = TimeComparison::Lexical,
            "chronological" => config.time_comparison = TimeComparison::Chronological,
            other => warnings.push(format!(
                "[query] time_comparison = \"{other}\" is not recognised. \
                 Expected \"lexical\" or \"chronological\". Using default (lexical).",
            )),
        }
    }

    // -- Query: row_limit --
    if let Some(n) = raw.query.row_limit {
        if (1..=constants::MAX_ROW_LIMIT).contains(&n) {
            config.row_limit = n;
        } else {
            warnings.push(format!(
                "[query] row_limit = {n} is out of range (1-{}). Using default ({}).",
                constants::MAX_ROW_LIMIT,
                constants::DEFAULT_ROW_LIMIT,
            ));
        }
    }

    // -- Rules: file --
    if let Some(ref file) = raw.rules.file {
        if !file.is_empty() {
            let path = PathBuf::from(file);
            config.rules_file = Some(if path.is_relative() {
                source_path.parent().unwrap_or(Path::new(".")).join(path)
            } else {
                path
            });
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    Ok((config, warnings))
}
