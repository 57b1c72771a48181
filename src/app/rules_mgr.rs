// LogScope - app/rules_mgr.rs
//
// Chooses the categorisation rule table: the built-in table embedded in the
// binary, or a user rules file on disk that replaces it.

use crate::core::rules::{self, Categorizer, RuleSource};
use crate::platform::fs::read_file_lossy;
use crate::util::constants;
use crate::util::error::RuleError;
use std::path::Path;

/// Load the rule table to categorise with.
///
/// `explicit` (from --rules or config) wins over `default_user_file` (the
/// platform rules.toml, used only when it exists). A user file that fails to
/// load is reported and the built-in table is used instead.
///
/// Returns the categoriser and any non-fatal errors encountered.
pub fn load_rules(
    explicit: Option<&Path>,
    default_user_file: Option<&Path>,
) -> (Categorizer, Vec<RuleError>) {
    let candidate = explicit.or_else(|| default_user_file.filter(|p| p.is_file()));

    let Some(path) = candidate else {
        let builtin = rules::load_builtin_rules();
        tracing::info!(patterns = builtin.pattern_count(), "Using built-in rules");
        return (builtin, Vec::new());
    };

    match load_rules_file(path) {
        Ok(categorizer) => {
            tracing::info!(
                path = %path.display(),
                patterns = categorizer.pattern_count(),
                "Loaded user rules"
            );
            (categorizer, Vec::new())
        }
        Err(e) => {
            tracing::warn!(error = %e, "User rules rejected; falling back to built-in rules");
            (rules::load_builtin_rules(), vec![e])
        }
    }
}

/// Read, size-check, parse, and compile one rules file.
pub fn load_rules_file(path: &Path) -> Result<Categorizer, RuleError> {
    let metadata = std::fs::metadata(path).map_err(|e| RuleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if metadata.len() > constants::MAX_RULES_FILE_SIZE {
        return Err(RuleError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_RULES_FILE_SIZE,
        });
    }

    let content = read_file_lossy(path).map_err(|e| RuleError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    rules::parse_rules_toml(&content, path)
        .and_then(|def| rules::compile_rules(def, RuleSource::File(path.to_path_buf())))
}
