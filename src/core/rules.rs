// LogScope - core/rules.rs
//
// Categorisation rule tables and the categoriser that applies them.
// Core layer: accepts TOML strings, never touches the filesystem.
// I/O is handled by app::rules_mgr which feeds content here.

use crate::core::model::Category;
use crate::util::constants;
use crate::util::error::RuleError;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML rules file as deserialized from disk or the embedded default.
#[derive(Debug, Deserialize)]
pub struct RulesDefinition {
    pub rules: RuleListsDef,
}

/// The three ordered pattern lists. A missing list is an empty list.
#[derive(Debug, Deserialize, Default)]
pub struct RuleListsDef {
    #[serde(default)]
    pub error: Vec<String>,
    #[serde(default)]
    pub warning: Vec<String>,
    #[serde(default)]
    pub info: Vec<String>,
}

/// Where a compiled rule set came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    Builtin,
    File(PathBuf),
}

impl std::fmt::Display for RuleSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleSource::Builtin => f.write_str("built-in"),
            RuleSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// =============================================================================
// Compiled rules
// =============================================================================

/// One priority level: a category and the patterns that select it.
#[derive(Debug, Clone)]
pub struct RuleTable {
    pub category: Category,
    pub patterns: Vec<Regex>,
}

impl RuleTable {
    /// True if any pattern matches anywhere in `message`.
    pub fn matches(&self, message: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(message))
    }
}

/// Assigns exactly one `Category` to a message.
///
/// Tables are scanned in order and the first table with a matching pattern
/// wins; a message no table matches is `Category::Misc`. The tables are
/// fixed at construction, so a categoriser can be shared freely.
#[derive(Debug, Clone)]
pub struct Categorizer {
    tables: Vec<RuleTable>,
    source: RuleSource,
}

impl Categorizer {
    /// Build a categoriser from already-compiled tables, scanned in the
    /// given order.
    pub fn new(tables: Vec<RuleTable>, source: RuleSource) -> Self {
        Self { tables, source }
    }

    /// A categoriser with no rules; every message is `Misc`.
    pub fn empty() -> Self {
        Self::new(Vec::new(), RuleSource::Builtin)
    }

    /// Categorise a message. Total: never fails, always one category.
    pub fn categorize(&self, message: &str) -> Category {
        self.tables
            .iter()
            .find(|table| table.matches(message))
            .map(|table| table.category)
            .unwrap_or(Category::Misc)
    }

    pub fn tables(&self) -> &[RuleTable] {
        &self.tables
    }

    pub fn source(&self) -> &RuleSource {
        &self.source
    }

    /// Total number of patterns across all tables.
    pub fn pattern_count(&self) -> usize {
        self.tables.iter().map(|t| t.patterns.len()).sum()
    }
}

// =============================================================================
// Validation and compilation
// =============================================================================

/// Parse a TOML string into a `RulesDefinition`.
///
/// `source_path` is used for error messages only (not for I/O).
pub fn parse_rules_toml(
    toml_content: &str,
    source_path: &Path,
) -> Result<RulesDefinition, RuleError> {
    toml::from_str(toml_content).map_err(|e| RuleError::TomlParse {
        path: source_path.to_path_buf(),
        source: e,
    })
}

/// Validate a `RulesDefinition` and compile it into a `Categorizer`.
///
/// Every pattern is compiled case-insensitively. The first invalid pattern
/// rejects the whole definition so a half-applied table never exists.
pub fn compile_rules(def: RulesDefinition, source: RuleSource) -> Result<Categorizer, RuleError> {
    let lists = [
        (Category::Error, "error", def.rules.error),
        (Category::Warning, "warning", def.rules.warning),
        (Category::Info, "info", def.rules.info),
    ];

    let mut tables = Vec::with_capacity(lists.len());
    for (category, list, patterns) in lists {
        if patterns.len() > constants::MAX_PATTERNS_PER_RULE {
            return Err(RuleError::TooManyPatterns {
                list,
                count: patterns.len(),
                max: constants::MAX_PATTERNS_PER_RULE,
            });
        }
        let compiled = patterns
            .iter()
            .map(|p| compile_rule_pattern(list, p))
            .collect::<Result<Vec<_>, _>>()?;
        tables.push(RuleTable {
            category,
            patterns: compiled,
        });
    }

    let categorizer = Categorizer::new(tables, source);
    tracing::debug!(
        source = %categorizer.source(),
        patterns = categorizer.pattern_count(),
        "Rules compiled"
    );
    Ok(categorizer)
}

/// Compile one rule pattern with length validation to prevent ReDoS.
fn compile_rule_pattern(list: &'static str, pattern: &str) -> Result<Regex, RuleError> {
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(RuleError::RegexTooLong {
            list,
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }

    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| RuleError::InvalidRegex {
            list,
            pattern: pattern.to_string(),
            source: e,
        })
}

// =============================================================================
// Built-in rules (embedded at compile time)
// =============================================================================

/// Embedded TOML content of the default rule table.
pub const BUILTIN_RULES_TOML: &str = include_str!("../../rules/default_rules.toml");

/// Load and compile the built-in rule table.
///
/// A failure here is a bug in the embedded file; it is logged and the
/// categoriser degrades to an empty table (everything `Misc`) rather than
/// aborting the run.
pub fn load_builtin_rules() -> Categorizer {
    let path = PathBuf::from("<builtin>/default_rules.toml");
    match parse_rules_toml(BUILTIN_RULES_TOML, &path)
        .and_then(|def| compile_rules(def, RuleSource::Builtin))
    {
        Ok(categorizer) => categorizer,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load built-in rules");
            Categorizer::empty()
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(toml: &str) -> Result<Categorizer, RuleError> {
        let path = PathBuf::from("test.toml");
        parse_rules_toml(toml, &path).and_then(|def| compile_rules(def, RuleSource::File(path)))
    }

    #[test]
    fn test_builtin_rules_load() {
        let rules = load_builtin_rules();
        assert_eq!(rules.tables().len(), 3);
        assert_eq!(rules.tables()[0].patterns.len(), 14);
        assert_eq!(rules.tables()[1].patterns.len(), 7);
        assert_eq!(rules.tables()[2].patterns.len(), 14);
        assert_eq!(rules.source(), &RuleSource::Builtin);
    }

    #[test]
    fn test_priority_error_beats_info() {
        let rules = load_builtin_rules();
        assert_eq!(rules.categorize("fatal: connection lost"), Category::Error);
        assert_eq!(rules.categorize("Connection established"), Category::Info);
    }

    #[test]
    fn test_each_category_reachable() {
        let rules = load_builtin_rules();
        assert_eq!(rules.categorize("disk read error"), Category::Error);
        assert_eq!(rules.categorize("API is deprecated"), Category::Warning);
        assert_eq!(rules.categorize("Started Session 4 of user"), Category::Info);
        assert_eq!(rules.categorize("pam_unix session opened"), Category::Misc);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let rules = load_builtin_rules();
        assert_eq!(rules.categorize("OUT OF MEMORY"), Category::Error);
        assert_eq!(rules.categorize("WARNING: low battery"), Category::Warning);
    }

    #[test]
    fn test_bracketed_severity_codes() {
        let rules = load_builtin_rules();
        assert_eq!(rules.categorize("<3> device gone"), Category::Error);
        assert_eq!(rules.categorize("<4> link flapping"), Category::Warning);
        assert_eq!(rules.categorize("<6> link up"), Category::Info);
        assert_eq!(rules.categorize("<7> tick"), Category::Misc);
    }

    #[test]
    fn test_empty_categorizer_is_total() {
        let rules = Categorizer::empty();
        for msg in ["", "fatal error", "anything"] {
            assert_eq!(rules.categorize(msg), Category::Misc);
        }
    }

    #[test]
    fn test_custom_rules_replace_defaults() {
        let rules = compile(
            r#"
[rules]
error = ['^panic']
info = ["heartbeat"]
"#,
        )
        .unwrap();

        assert_eq!(rules.categorize("panic at the disco"), Category::Error);
        // Anchored: "panic" mid-message does not match the error list.
        assert_eq!(rules.categorize("no panic here"), Category::Misc);
        assert_eq!(rules.categorize("heartbeat ok"), Category::Info);
        // Default keywords are gone.
        assert_eq!(rules.categorize("fatal error"), Category::Misc);
    }

    #[test]
    fn test_invalid_rule_pattern_rejected() {
        let result = compile(
            r#"
[rules]
warning = ["ok", "[broken"]
"#,
        );
        match result {
            Err(RuleError::InvalidRegex { list, pattern, .. }) => {
                assert_eq!(list, "warning");
                assert_eq!(pattern, "[broken");
            }
            other => panic!("Expected InvalidRegex, got: {other:?}"),
        }
    }

    #[test]
    fn test_rule_pattern_too_long() {
        let long = "a".repeat(constants::MAX_REGEX_PATTERN_LENGTH + 1);
        let toml = format!("[rules]\ninfo = ['{long}']\n");
        assert!(matches!(
            compile(&toml),
            Err(RuleError::RegexTooLong { list: "info", .. })
        ));
    }

    #[test]
    fn test_missing_rules_table_is_parse_error() {
        assert!(matches!(
            compile("error = [\"x\"]"),
            Err(RuleError::TomlParse { .. })
        ));
    }
}
