// LogScope - core/filter.rs
//
// Composable filter engine for log records.
// Every active predicate within a spec, and every spec in a list, is
// AND-combined. Core layer: pure logic, no I/O.

use crate::core::model::{Category, LogRecord};
use crate::core::parser::parse_timestamp;
use crate::util::constants;
use crate::util::error::FilterError;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Time bounds
// =============================================================================

/// How time-range bounds are compared against record timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeComparison {
    /// String comparison on the canonical "Mon DD HH:MM:SS" text.
    ///
    /// Month names do not sort chronologically ("Feb" < "Jan"), so ranges
    /// spanning a month boundary misbehave. Kept as the default so results
    /// match the classic textual comparison.
    #[default]
    Lexical,

    /// Bounds are parsed with the record timestamp format and compared as
    /// points in time.
    Chronological,
}

/// A compiled inclusive time bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBound {
    Lexical(String),
    Chronological(NaiveDateTime),
}

impl TimeBound {
    fn build(
        field: &'static str,
        raw: &str,
        mode: TimeComparison,
    ) -> Result<Option<Self>, FilterError> {
        // Surrounding blanks never take part in the comparison.
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        match mode {
            TimeComparison::Lexical => Ok(Some(TimeBound::Lexical(raw.to_string()))),
            TimeComparison::Chronological => parse_timestamp(raw)
                .map(|ts| Some(TimeBound::Chronological(ts)))
                .ok_or_else(|| FilterError::InvalidTimestamp {
                    field,
                    value: raw.to_string(),
                    format: constants::TIMESTAMP_FORMAT,
                }),
        }
    }

    /// Ordering of the record relative to this bound.
    fn compare(&self, record: &LogRecord, record_text: &str) -> std::cmp::Ordering {
        match self {
            TimeBound::Lexical(bound) => record_text.cmp(bound.as_str()),
            TimeBound::Chronological(bound) => record.timestamp.cmp(bound),
        }
    }
}

// =============================================================================
// Filter specification
// =============================================================================

/// Raw, uncompiled filter as typed by a user or read from config.
///
/// Compiling it into a `FilterSpec` is where invalid input is rejected.
/// Empty strings count as "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterQuery {
    pub name: String,
    pub message: Vec<String>,
    pub process: Vec<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub category: Option<String>,
}

impl FilterQuery {
    /// Compile into a `FilterSpec`, failing before any record is scanned.
    pub fn compile(&self, mode: TimeComparison) -> Result<FilterSpec, FilterError> {
        let mut spec = FilterSpec::named(&self.name);
        for pattern in self.message.iter().filter(|p| !p.is_empty()) {
            spec.add_message_pattern(pattern)?;
        }
        for pattern in self.process.iter().filter(|p| !p.is_empty()) {
            spec.add_process_pattern(pattern)?;
        }
        if let Some(start) = &self.start_time {
            spec.start_time = TimeBound::build("start time", start, mode)?;
        }
        if let Some(end) = &self.end_time {
            spec.end_time = TimeBound::build("end time", end, mode)?;
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            spec.category = Some(category.parse()?);
        }
        Ok(spec)
    }
}

/// A named bundle of compiled predicates. All set fields are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Display name (tab label for the category filters).
    pub name: String,

    /// Every pattern must match somewhere in the message.
    pub message: Vec<Regex>,

    /// Every pattern must match somewhere in the process.
    pub process: Vec<Regex>,

    /// Inclusive lower bound.
    pub start_time: Option<TimeBound>,

    /// Inclusive upper bound.
    pub end_time: Option<TimeBound>,

    /// Exact category match.
    pub category: Option<Category>,
}

impl FilterSpec {
    /// An identity spec with a name.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// A spec matching one category.
    pub fn for_category(name: &str, category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::named(name)
        }
    }

    /// Returns true if no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
            && self.process.is_empty()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.category.is_none()
    }

    /// Compile and add a message pattern.
    /// Returns an error if the pattern is invalid.
    pub fn add_message_pattern(&mut self, pattern: &str) -> Result<(), FilterError> {
        self.message.push(compile_filter_regex("message", pattern)?);
        Ok(())
    }

    /// Compile and add a process pattern.
    /// Returns an error if the pattern is invalid.
    pub fn add_process_pattern(&mut self, pattern: &str) -> Result<(), FilterError> {
        self.process.push(compile_filter_regex("process", pattern)?);
        Ok(())
    }

    /// Check a single record against every active predicate.
    pub fn matches(&self, record: &LogRecord) -> bool {
        if !self.message.iter().all(|re| re.is_match(&record.message)) {
            return false;
        }

        if !self.process.iter().all(|re| re.is_match(&record.process)) {
            return false;
        }

        if self.start_time.is_some() || self.end_time.is_some() {
            let text = record.timestamp_text();
            if let Some(ref start) = self.start_time {
                if start.compare(record, &text).is_lt() {
                    return false;
                }
            }
            if let Some(ref end) = self.end_time {
                if end.compare(record, &text).is_gt() {
                    return false;
                }
            }
        }

        if let Some(category) = self.category {
            if record.category != category {
                return false;
            }
        }

        true
    }
}

fn compile_filter_regex(field: &'static str, pattern: &str) -> Result<Regex, FilterError> {
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(FilterError::RegexTooLong {
            field,
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }
    Regex::new(pattern).map_err(|e| FilterError::InvalidRegex {
        field,
        pattern: pattern.to_string(),
        source: e,
    })
}

// =============================================================================
// Applying filters
// =============================================================================

/// Returns true if every spec is the identity filter (including no specs).
pub fn is_identity(specs: &[FilterSpec]) -> bool {
    specs.iter().all(FilterSpec::is_empty)
}

/// Apply filter specs to records, returning the matching records in their
/// original order.
///
/// When every spec is empty the input is returned unchanged.
pub fn apply_filters<'a>(records: &'a [LogRecord], specs: &[FilterSpec]) -> Vec<&'a LogRecord> {
    if is_identity(specs) {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|record| specs.iter().all(|spec| spec.matches(record)))
        .collect()
}

/// Same selection as `apply_filters`, as indices into `records`.
///
/// Lets long-lived state keep a view over the record set without borrowing it.
pub fn filter_indices(records: &[LogRecord], specs: &[FilterSpec]) -> Vec<usize> {
    if is_identity(specs) {
        return (0..records.len()).collect();
    }

    records
        .iter()
        .enumerate()
        .filter(|(_, record)| specs.iter().all(|spec| spec.matches(record)))
        .map(|(idx, _)| idx)
        .collect()
}

/// The per-category tab filters, followed by the identity "All" tab.
pub fn category_filters() -> Vec<FilterSpec> {
    Category::all()
        .iter()
        .map(|c| FilterSpec::for_category(c.tab_label(), *c))
        .chain(std::iter::once(FilterSpec::named("All")))
        .collect()
}
