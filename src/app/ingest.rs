// LogScope - app/ingest.rs
//
// Loads the record set: resolves source arguments to an ordered list of
// sources, reads each fully into memory in order, then parses and
// categorises the concatenated lines in one batch.

use crate::core::aggregate;
use crate::core::model::{IngestSummary, LogRecord};
use crate::core::parser;
use crate::core::rules::Categorizer;
use crate::platform::fs::read_lines_lossy;
use crate::util::error::IngestError;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Stdin,
}

impl Source {
    /// Display name for summaries and logs.
    pub fn name(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Stdin => "<stdin>".to_string(),
        }
    }
}

/// Result of loading all sources.
#[derive(Debug, Default)]
pub struct LoadResult {
    pub records: Vec<LogRecord>,
    pub summary: IngestSummary,
}

fn is_glob_pattern(arg: &str) -> bool {
    arg.chars().any(|c| matches!(c, '*' | '?' | '['))
}

/// Resolve command-line source arguments into an ordered source list.
///
/// Arguments keep their order. A glob pattern expands in place to its
/// matches in sorted order; `-` means stdin; no arguments at all means
/// stdin. A malformed pattern is an error, a pattern with no matches is
/// logged and contributes nothing.
pub fn resolve_sources(args: &[String]) -> Result<Vec<Source>, IngestError> {
    if args.is_empty() {
        return Ok(vec![Source::Stdin]);
    }

    let mut sources = Vec::new();
    for arg in args {
        if arg == "-" {
            sources.push(Source::Stdin);
        } else if is_glob_pattern(arg) {
            let paths = glob::glob(arg).map_err(|e| IngestError::InvalidGlob {
                pattern: arg.clone(),
                source: e,
            })?;
            let mut matches: Vec<PathBuf> = paths
                .filter_map(|entry| match entry {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping unreadable glob match");
                        None
                    }
                })
                .filter(|path| path.is_file())
                .collect();
            matches.sort();
            if matches.is_empty() {
                tracing::warn!(pattern = %arg, "Source pattern matched no files");
            }
            sources.extend(matches.into_iter().map(Source::File));
        } else {
            sources.push(Source::File(PathBuf::from(arg)));
        }
    }

    Ok(sources)
}

/// Read all lines of one source.
pub fn read_source(source: &Source) -> Result<Vec<String>, IngestError> {
    match source {
        Source::File(path) => read_file_lines(path),
        Source::Stdin => read_lines_lossy(io::stdin().lock()).map_err(|e| IngestError::Io {
            path: PathBuf::from("<stdin>"),
            source: e,
        }),
    }
}

fn read_file_lines(path: &Path) -> Result<Vec<String>, IngestError> {
    let to_err = |e| IngestError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    let file = std::fs::File::open(path).map_err(to_err)?;
    read_lines_lossy(io::BufReader::new(file)).map_err(to_err)
}

/// Read every source in order, then parse and categorise.
///
/// A source that cannot be read is logged and skipped; the remaining
/// sources still load.
pub fn load_sources(sources: &[Source], categorizer: &Categorizer) -> LoadResult {
    let started = Instant::now();
    let mut lines: Vec<String> = Vec::new();
    let mut names = Vec::new();
    let mut failed = 0;

    for source in sources {
        match read_source(source) {
            Ok(source_lines) => {
                tracing::debug!(source = %source.name(), lines = source_lines.len(), "Source read");
                lines.extend(source_lines);
                names.push(source.name());
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not read source");
                failed += 1;
            }
        }
    }

    let mut result = load_lines(lines, categorizer);
    result.summary.sources = names;
    result.summary.sources_failed = failed;
    result.summary.duration = started.elapsed();
    result
}

/// Parse and categorise an in-memory line sequence.
pub fn load_lines<I, S>(lines: I, categorizer: &Categorizer) -> LoadResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let started = Instant::now();
    let parsed = parser::parse_lines(lines, categorizer);
    let span = aggregate::time_span(&parsed.records);

    let summary = IngestSummary {
        sources: Vec::new(),
        sources_failed: 0,
        lines_read: parsed.lines_processed,
        lines_rejected: parsed.rejected,
        total_records: parsed.records.len(),
        records_by_category: aggregate::category_counts(&parsed.records),
        earliest: span.map(|(lo, _)| lo),
        latest: span.map(|(_, hi)| hi),
        loaded_at: Some(chrono::Utc::now()),
        duration: started.elapsed(),
    };

    tracing::info!(
        records = summary.total_records,
        rejected = summary.lines_rejected,
        "Load complete"
    );

    LoadResult {
        records: parsed.records,
        summary,
    }
}
