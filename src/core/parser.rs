// LogScope - core/parser.rs
//
// Syslog line parsing: one fixed line shape, "Mon DD HH:MM:SS host proc: msg".
// Core layer: accepts lines of text, never touches the filesystem directly.

use crate::core::model::LogRecord;
use crate::core::rules::Categorizer;
use crate::util::constants;
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::OnceLock;

/// A line that matched the syslog shape, before categorisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub timestamp: NaiveDateTime,
    pub process: String,
    pub message: String,
}

/// Result of parsing a batch of lines.
#[derive(Debug, Default)]
pub struct ParseResult {
    /// Parsed and categorised records, in input order.
    pub records: Vec<LogRecord>,
    /// Total lines consumed.
    pub lines_processed: u64,
    /// Lines dropped because they did not match the line shape.
    pub rejected: u64,
}

/// The fixed line pattern: timestamp token, host (or anything), then the
/// shortest `process: ` prefix, then the message.
fn line_pattern() -> &'static Regex {
    static LINE: OnceLock<Regex> = OnceLock::new();
    LINE.get_or_init(|| {
        Regex::new(r"^(\w+? \d+? \d+?:\d+?:\d+?) .*? (.*?): (.*)$")
            .expect("line_pattern: invalid regex")
    })
}

/// Parse a single line.
///
/// Returns `None` when the line does not have the syslog shape or its
/// timestamp is not a valid "Mon DD HH:MM:SS". No partial result is ever
/// produced.
pub fn parse_line(line: &str) -> Option<ParsedLine> {
    let caps = line_pattern().captures(line)?;
    let timestamp = parse_timestamp(&caps[1])?;
    Some(ParsedLine {
        timestamp,
        process: caps[2].to_string(),
        message: caps[3].to_string(),
    })
}

/// Exact shape of a timestamp: every numeric field zero-padded to two digits.
fn timestamp_shape() -> &'static Regex {
    static SHAPE: OnceLock<Regex> = OnceLock::new();
    SHAPE.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{3} [0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$")
            .expect("timestamp_shape: invalid regex")
    })
}

/// Parse a year-less "Mon DD HH:MM:SS" timestamp.
///
/// chrono alone accepts unpadded fields ("Jan 2 3:4:5"), so the text must
/// first match the fixed two-digit shape. The year is fixed to
/// `PLACEHOLDER_YEAR`; logs spanning a new year will not order correctly.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if !timestamp_shape().is_match(raw) {
        return None;
    }
    let with_year = format!("{} {}", constants::PLACEHOLDER_YEAR, raw);
    let format = format!("%Y {}", constants::TIMESTAMP_FORMAT);
    NaiveDateTime::parse_from_str(&with_year, &format).ok()
}

/// Parse and categorise a sequence of lines.
///
/// Lines are consumed in order; rejected lines are skipped without
/// disturbing the order of kept records. Each kept line is categorised
/// immediately and the category is never recomputed.
pub fn parse_lines<I, S>(lines: I, categorizer: &Categorizer) -> ParseResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result = ParseResult::default();

    for line in lines {
        let line = line.as_ref();
        result.lines_processed += 1;

        match parse_line(line) {
            Some(parsed) => {
                let category = categorizer.categorize(&parsed.message);
                result.records.push(LogRecord {
                    timestamp: parsed.timestamp,
                    process: parsed.process,
                    message: parsed.message,
                    category,
                });
            }
            None => {
                result.rejected += 1;
                tracing::trace!(
                    line = result.lines_processed,
                    preview = %preview(line),
                    "Line rejected"
                );
            }
        }
    }

    tracing::debug!(
        records = result.records.len(),
        rejected = result.rejected,
        lines = result.lines_processed,
        "Parsing complete"
    );

    result
}

/// Truncate a line for trace output.
fn preview(line: &str) -> &str {
    match line.char_indices().nth(constants::DEBUG_MAX_LINE_PREVIEW) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}
