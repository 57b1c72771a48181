// LogScope - core/aggregate.rs
//
// Read-only analytics over an (already filtered) record set: category
// counts, top-N process frequency, and time-bucketed volume trend.
//
// Functions take `&[R] where R: Borrow<LogRecord>` so they accept both the
// owned record set and the borrowed views returned by the filter engine.

use crate::core::model::{Category, FrequencyEntry, LogRecord};
use chrono::NaiveDateTime;
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};

/// Count records per category. Every category is present, zero-filled.
pub fn category_counts<R: Borrow<LogRecord>>(records: &[R]) -> BTreeMap<Category, usize> {
    let mut counts: BTreeMap<Category, usize> =
        Category::all().iter().map(|c| (*c, 0)).collect();
    for record in records {
        *counts.entry(record.borrow().category).or_insert(0) += 1;
    }
    counts
}

/// The `n` most frequent process values, most frequent first.
///
/// Length is `min(n, distinct processes)`. Equal counts are ordered by
/// process name so the output is stable across runs.
pub fn top_processes<R: Borrow<LogRecord>>(records: &[R], n: usize) -> Vec<FrequencyEntry> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.borrow().process.as_str()).or_insert(0) += 1;
    }

    let mut entries: Vec<FrequencyEntry> = counts
        .into_iter()
        .map(|(key, count)| FrequencyEntry {
            key: key.to_string(),
            count,
        })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    entries.truncate(n);
    entries
}

/// Earliest and latest timestamp in a single pass, `None` when empty.
pub fn time_span<R: Borrow<LogRecord>>(records: &[R]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let mut iter = records.iter().map(|r| r.borrow().timestamp);
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts))))
}

/// Split the observed time range into `n` equal-width buckets and count
/// the records falling in each.
///
/// A record's bucket is `floor((t - earliest) / width)` with
/// `width = (latest - earliest) / n`, clamped to the last bucket so the
/// latest record is included. The width is kept as an exact fraction so a
/// span shorter than `n` milliseconds still spreads across buckets.
///
/// Degenerate inputs never panic: `n == 0` yields no buckets, an empty set
/// yields `n` zeros, and a zero-length span puts every record in bucket 0.
/// For any non-empty set and `n >= 1` the buckets sum to `records.len()`.
pub fn trend<R: Borrow<LogRecord>>(records: &[R], n: usize) -> Vec<usize> {
    let mut buckets = vec![0usize; n];
    if n == 0 {
        return buckets;
    }
    let Some((earliest, latest)) = time_span(records) else {
        return buckets;
    };

    let span_ms = i128::from((latest - earliest).num_milliseconds());
    let last = n - 1;

    for record in records {
        let index = if span_ms == 0 {
            0
        } else {
            let offset_ms = i128::from((record.borrow().timestamp - earliest).num_milliseconds());
            let raw = offset_ms * n as i128 / span_ms;
            usize::try_from(raw).unwrap_or(last).min(last)
        };
        buckets[index] += 1;
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(secs: u32, process: &str) -> LogRecord {
        LogRecord {
            timestamp: NaiveDate::from_ymd_opt(2000, 1, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
                + chrono::Duration::seconds(i64::from(secs)),
            process: process.to_string(),
            message: String::new(),
            category: Category::Misc,
        }
    }

    #[test]
    fn test_top_processes_scenario() {
        let records = vec![at(0, "sshd"), at(5, "sshd"), at(10, "cron")];
        let top = top_processes(&records, 1);
        assert_eq!(
            top,
            vec![FrequencyEntry {
                key: "sshd".to_string(),
                count: 2
            }]
        );
    }

    #[test]
    fn test_top_processes_bound_and_order() {
        let records = vec![
            at(0, "a"),
            at(1, "b"),
            at(2, "b"),
            at(3, "c"),
            at(4, "c"),
            at(5, "c"),
        ];
        for n in 0..6 {
            let top = top_processes(&records, n);
            assert_eq!(top.len(), n.min(3));
            assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
        }
        let keys: Vec<_> = top_processes(&records, 10).into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_top_processes_ties_by_name() {
        let records = vec![at(0, "zeta"), at(1, "alpha"), at(2, "mid")];
        let keys: Vec<_> = top_processes(&records, 3).into_iter().map(|e| e.key).collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_top_processes_empty() {
        assert!(top_processes::<LogRecord>(&[], 5).is_empty());
    }

    #[test]
    fn test_top_processes_counts_empty_process() {
        let records = vec![at(0, ""), at(1, "")];
        let top = top_processes(&records, 5);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, "");
        assert_eq!(top[0].count, 2);
    }

    #[test]
    fn test_trend_even_spread() {
        // Span 100s, 5 buckets of 20s.
        let records: Vec<_> = [0, 10, 20, 45, 60, 99, 100]
            .iter()
            .map(|s| at(*s, "p"))
            .collect();
        assert_eq!(trend(&records, 5), vec![2, 1, 1, 1, 2]);
    }

    #[test]
    fn test_trend_sum_invariant() {
        let records: Vec<_> = [3, 7, 7, 8, 15, 21, 22, 40]
            .iter()
            .map(|s| at(*s, "p"))
            .collect();
        for n in 1..=12 {
            let buckets = trend(&records, n);
            assert_eq!(buckets.len(), n);
            assert_eq!(buckets.iter().sum::<usize>(), records.len(), "n = {n}");
        }
    }

    #[test]
    fn test_trend_span_shorter_than_bucket_count() {
        // 1 second span over 5 buckets must not divide by zero.
        let records = vec![at(0, "p"), at(1, "p")];
        assert_eq!(trend(&records, 5), vec![1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_trend_single_instant() {
        let records = vec![at(7, "p"), at(7, "q"), at(7, "r")];
        assert_eq!(trend(&records, 4), vec![3, 0, 0, 0]);
    }

    #[test]
    fn test_trend_empty_is_zeroed() {
        assert_eq!(trend::<LogRecord>(&[], 3), vec![0, 0, 0]);
        assert!(trend(&[at(0, "p")], 0).is_empty());
    }

    #[test]
    fn test_trend_accepts_borrowed_view() {
        let records = vec![at(0, "p"), at(10, "p")];
        let view: Vec<&LogRecord> = records.iter().collect();
        assert_eq!(trend(&view, 2), vec![1, 1]);
    }

    #[test]
    fn test_category_counts_zero_filled() {
        let mut records = vec![at(0, "p"), at(1, "p")];
        records[0].category = Category::Error;
        let counts = category_counts(&records);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[&Category::Error], 1);
        assert_eq!(counts[&Category::Misc], 1);
        assert_eq!(counts[&Category::Warning], 0);
    }

    #[test]
    fn test_time_span() {
        let records = vec![at(30, "p"), at(5, "p"), at(12, "p")];
        let (lo, hi) = time_span(&records).unwrap();
        assert_eq!((hi - lo).num_seconds(), 25);
        assert!(time_span::<LogRecord>(&[]).is_none());
    }
}
