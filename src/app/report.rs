// LogScope - app/report.rs
//
// Plain-text rendering of the session views: load summary, tab counts,
// filtered rows, top processes, and the volume trend.

use crate::app::state::AppState;
use crate::util::constants;
use std::io::{self, Write};

/// Render the full report for the current session state.
///
/// At most `row_limit` rows are printed; the header says how many were
/// omitted.
pub fn render<W: Write>(state: &AppState, out: &mut W, row_limit: usize) -> io::Result<()> {
    render_summary(state, out)?;
    writeln!(out)?;
    render_tabs(state, out)?;
    writeln!(out)?;
    render_rows(state, out, row_limit)?;
    writeln!(out)?;
    render_top_processes(state, out)?;
    writeln!(out)?;
    render_trend(state, out)
}

fn render_summary<W: Write>(state: &AppState, out: &mut W) -> io::Result<()> {
    let summary = &state.summary;
    writeln!(
        out,
        "{} {}",
        constants::APP_NAME,
        constants::APP_VERSION
    )?;
    write!(out, "Sources: {} read", summary.sources.len())?;
    if summary.sources_failed > 0 {
        write!(out, ", {} failed", summary.sources_failed)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Lines: {} read, {} rejected, {} records",
        summary.lines_read, summary.lines_rejected, summary.total_records
    )?;
    if let (Some(earliest), Some(latest)) = (summary.earliest, summary.latest) {
        writeln!(
            out,
            "Span: {} .. {}",
            earliest.format(constants::TIMESTAMP_FORMAT),
            latest.format(constants::TIMESTAMP_FORMAT)
        )?;
    }
    Ok(())
}

fn render_tabs<W: Write>(state: &AppState, out: &mut W) -> io::Result<()> {
    let labels: Vec<String> = state
        .tabs
        .iter()
        .enumerate()
        .map(|(idx, tab)| {
            if idx == state.active_tab {
                format!("[{} {}]", tab.name(), tab.indices.len())
            } else {
                format!("{} {}", tab.name(), tab.indices.len())
            }
        })
        .collect();
    writeln!(out, "Tabs: {}", labels.join("  "))
}

fn render_rows<W: Write>(state: &AppState, out: &mut W, row_limit: usize) -> io::Result<()> {
    let rows = state.filtered_records();
    let shown = rows.len().min(row_limit);
    if shown < rows.len() {
        writeln!(out, "Rows ({shown} of {}):", rows.len())?;
    } else {
        writeln!(out, "Rows ({}):", rows.len())?;
    }

    let process_width = rows
        .iter()
        .take(shown)
        .map(|r| r.process.chars().count())
        .max()
        .unwrap_or(0);
    for record in rows.iter().take(shown) {
        writeln!(
            out,
            "  {}  {:<width$}  {}",
            record.timestamp_text(),
            record.process,
            record.message,
            width = process_width
        )?;
    }
    Ok(())
}

fn render_top_processes<W: Write>(state: &AppState, out: &mut W) -> io::Result<()> {
    writeln!(out, "Top processes:")?;
    if state.top_processes.is_empty() {
        return writeln!(out, "  (none)");
    }

    let key_width = state
        .top_processes
        .iter()
        .map(|e| e.key.chars().count())
        .max()
        .unwrap_or(0);
    let max = state.top_processes.iter().map(|e| e.count).max().unwrap_or(0);
    for entry in &state.top_processes {
        writeln!(
            out,
            "  {:<width$}  {:>6}  {}",
            entry.key,
            entry.count,
            bar(entry.count, max),
            width = key_width
        )?;
    }
    Ok(())
}

fn render_trend<W: Write>(state: &AppState, out: &mut W) -> io::Result<()> {
    writeln!(out, "Trend ({} buckets):", state.trend.len())?;
    let max = state.trend.iter().copied().max().unwrap_or(0);
    for (idx, count) in state.trend.iter().enumerate() {
        writeln!(out, "  {:>3}  {:>6}  {}", idx + 1, count, bar(*count, max))?;
    }
    Ok(())
}

/// A bar scaled against `max`, at most `REPORT_BAR_WIDTH` wide. Any
/// non-zero count gets at least one mark.
fn bar(count: usize, max: usize) -> String {
    if count == 0 || max == 0 {
        return String::new();
    }
    let width = (count * constants::REPORT_BAR_WIDTH / max).max(1);
    "#".repeat(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ingest::load_lines;
    use crate::app::state::ViewSettings;
    use crate::core::filter::TimeComparison;
    use crate::core::rules::load_builtin_rules;

    fn render_to_string(state: &AppState, row_limit: usize) -> String {
        let mut buf = Vec::new();
        render(state, &mut buf, row_limit).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn scenario() -> AppState {
        let lines = [
            "Jan 01 10:00:00 host sshd: login failed",
            "Jan 01 10:00:05 host sshd: login success",
            "Jan 01 10:00:10 host cron: job completed",
        ];
        let loaded = load_lines(lines, &load_builtin_rules());
        AppState::new(
            loaded.records,
            loaded.summary,
            ViewSettings {
                top_n: 5,
                trend_buckets: 2,
                time_comparison: TimeComparison::Lexical,
            },
        )
    }

    #[test]
    fn test_report_sections() {
        let text = render_to_string(&scenario(), 100);
        assert!(text.contains("Lines: 3 read, 0 rejected, 3 records"));
        assert!(text.contains("Span: Jan 01 10:00:00 .. Jan 01 10:00:10"));
        assert!(text.contains("[All 3]"));
        assert!(text.contains("Errors 1"));
        assert!(text.contains("Informational 2"));
        assert!(text.contains("Rows (3):"));
        assert!(text.contains("Jan 01 10:00:05  sshd  login success"));
        assert!(text.contains("Trend (2 buckets):"));
    }

    #[test]
    fn test_row_limit_reported() {
        let text = render_to_string(&scenario(), 1);
        assert!(text.contains("Rows (1 of 3):"));
        assert!(!text.contains("job completed"));
    }

    #[test]
    fn test_bar_scaling() {
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(10, 10).len(), constants::REPORT_BAR_WIDTH);
        assert_eq!(bar(1, 1000).len(), 1);
    }
}
