// LogScope - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants::TIMESTAMP_FORMAT;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

// =============================================================================
// Log Record (output of parsing + categorisation)
// =============================================================================

/// A single parsed and categorised syslog line.
///
/// Records are immutable once categorised. The whole set is owned by the
/// session built at load time and only ever borrowed by filters and
/// aggregations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// Wall-clock time of the line, second precision.
    ///
    /// Source timestamps carry no year; the parser injects
    /// `PLACEHOLDER_YEAR`, so only month/day/time are meaningful.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,

    /// Process identifier as written before the colon (e.g. `sshd[812]`).
    pub process: String,

    /// Free-text message after `process: `.
    pub message: String,

    /// Severity category assigned by the categoriser.
    pub category: Category,
}

impl LogRecord {
    /// Canonical "Mon DD HH:MM:SS" rendering, the form used for display,
    /// export, and lexical time-range comparison.
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

// =============================================================================
// Category
// =============================================================================

/// Severity category, in priority order (the order rule lists are scanned).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Error,
    #[serde(rename = "warn", alias = "warning")]
    Warning,
    Info,
    #[default]
    Misc,
}

impl Category {
    /// Returns all variants in priority order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Error,
            Category::Warning,
            Category::Info,
            Category::Misc,
        ]
    }

    /// Lower-case key used on the command line, in config, and in exports.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Error => "error",
            Category::Warning => "warn",
            Category::Info => "info",
            Category::Misc => "misc",
        }
    }

    /// Plural tab label.
    pub fn tab_label(&self) -> &'static str {
        match self {
            Category::Error => "Errors",
            Category::Warning => "Warnings",
            Category::Info => "Informational",
            Category::Misc => "Uncategorised",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = crate::util::error::FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" | "err" | "errors" => Ok(Category::Error),
            "warn" | "warning" | "warnings" => Ok(Category::Warning),
            "info" | "informational" => Ok(Category::Info),
            "misc" | "uncategorised" | "uncategorized" => Ok(Category::Misc),
            _ => Err(crate::util::error::FilterError::UnknownCategory {
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Aggregation outputs
// =============================================================================

/// One row of the top-processes table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrequencyEntry {
    /// Process identifier.
    pub key: String,
    /// Occurrences in the aggregated set (always >= 1).
    pub count: usize,
}

// =============================================================================
// Ingest Summary
// =============================================================================

/// Statistics for a completed load of all input sources.
#[derive(Debug, Clone, Default)]
pub struct IngestSummary {
    /// Sources read successfully, in read order.
    pub sources: Vec<String>,

    /// Sources that could not be read.
    pub sources_failed: usize,

    /// Total lines consumed across all sources.
    pub lines_read: u64,

    /// Lines that did not match the syslog line shape.
    pub lines_rejected: u64,

    /// Records kept after parsing.
    pub total_records: usize,

    /// Records per category; every category present, zero-filled.
    pub records_by_category: BTreeMap<Category, usize>,

    /// Earliest record timestamp.
    pub earliest: Option<NaiveDateTime>,

    /// Latest record timestamp.
    pub latest: Option<NaiveDateTime>,

    /// When the load finished.
    pub loaded_at: Option<DateTime<Utc>>,

    /// Wall-clock load duration.
    pub duration: std::time::Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(category: Category) -> LogRecord {
        LogRecord {
            timestamp: NaiveDate::from_ymd_opt(2000, 1, 2)
                .unwrap()
                .and_hms_opt(3, 4, 5)
                .unwrap(),
            process: "proc".to_string(),
            message: "msg".to_string(),
            category,
        }
    }

    #[test]
    fn test_timestamp_text_is_canonical() {
        assert_eq!(record(Category::Misc).timestamp_text(), "Jan 02 03:04:05");
    }

    #[test]
    fn test_category_from_str_accepts_keys_and_labels() {
        assert_eq!("error".parse::<Category>().unwrap(), Category::Error);
        assert_eq!("warn".parse::<Category>().unwrap(), Category::Warning);
        assert_eq!("Warning".parse::<Category>().unwrap(), Category::Warning);
        assert_eq!("INFO".parse::<Category>().unwrap(), Category::Info);
        assert_eq!("misc".parse::<Category>().unwrap(), Category::Misc);
        assert!("critical".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_order_is_priority_order() {
        let mut sorted = Category::all().to_vec();
        sorted.sort();
        assert_eq!(sorted, Category::all());
    }

    #[test]
    fn test_record_serialises_with_text_timestamp() {
        let json = serde_json::to_string(&record(Category::Warning)).unwrap();
        assert!(json.contains(r#""timestamp":"Jan 02 03:04:05""#), "{json}");
        assert!(json.contains(r#""category":"warn""#), "{json}");
    }
}
