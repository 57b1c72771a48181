// LogScope - app/state.rs
//
// Session state. Holds the loaded record set, the category tabs, the
// active query, and the views derived from them (rows, top processes,
// trend). Views are recomputed synchronously on every query change.

use crate::core::aggregate;
use crate::core::filter::{self, FilterQuery, FilterSpec, TimeComparison};
use crate::core::model::{Category, FrequencyEntry, IngestSummary, LogRecord};
use crate::util::error::FilterError;

/// One category tab: its filter and the records it selects.
#[derive(Debug, Clone)]
pub struct Tab {
    pub spec: FilterSpec,

    /// Indices into `AppState::records`, computed once at load.
    pub indices: Vec<usize>,
}

impl Tab {
    pub fn name(&self) -> &str {
        &self.spec.name
    }
}

/// View parameters fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    pub top_n: usize,
    pub trend_buckets: usize,
    pub time_comparison: TimeComparison,
}

/// Top-level session state.
#[derive(Debug)]
pub struct AppState {
    /// All categorised records in load order. Never mutated after load.
    pub records: Vec<LogRecord>,

    /// Statistics from the load.
    pub summary: IngestSummary,

    /// Category tabs followed by "All".
    pub tabs: Vec<Tab>,

    /// Index into `tabs`.
    pub active_tab: usize,

    /// The query as last successfully applied.
    pub query: FilterQuery,

    /// Compiled form of `query`.
    query_spec: FilterSpec,

    pub settings: ViewSettings,

    /// Indices of records matching the active tab and query (into `records`).
    pub filtered_indices: Vec<usize>,

    /// Most frequent processes in the filtered set.
    pub top_processes: Vec<FrequencyEntry>,

    /// Record volume over time for the filtered set.
    pub trend: Vec<usize>,
}

impl AppState {
    /// Build the session: partition records into tabs, select "All", and
    /// compute the unfiltered views.
    pub fn new(records: Vec<LogRecord>, summary: IngestSummary, settings: ViewSettings) -> Self {
        let tabs: Vec<Tab> = filter::category_filters()
            .into_iter()
            .map(|spec| {
                let indices = filter::filter_indices(&records, std::slice::from_ref(&spec));
                Tab { spec, indices }
            })
            .collect();
        let active_tab = tabs.len().saturating_sub(1);

        let mut state = Self {
            records,
            summary,
            tabs,
            active_tab,
            query: FilterQuery::default(),
            query_spec: FilterSpec::default(),
            settings,
            filtered_indices: Vec::new(),
            top_processes: Vec::new(),
            trend: Vec::new(),
        };
        state.refresh();
        state
    }

    /// Switch to the tab at `index`. Returns false if out of range.
    pub fn select_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        if index != self.active_tab {
            self.active_tab = index;
            self.refresh();
        }
        true
    }

    /// Switch to a category's tab, or to "All" for `None`.
    pub fn select_category(&mut self, category: Option<Category>) {
        let index = self
            .tabs
            .iter()
            .position(|tab| tab.spec.category == category)
            .unwrap_or(self.tabs.len().saturating_sub(1));
        self.select_tab(index);
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.active_tab)
    }

    /// Compile and apply a new query.
    ///
    /// On error the previous query and every derived view stay untouched.
    pub fn apply_query(&mut self, query: FilterQuery) -> Result<(), FilterError> {
        let spec = query.compile(self.settings.time_comparison)?;
        tracing::debug!(
            message_patterns = spec.message.len(),
            process_patterns = spec.process.len(),
            bounded = spec.start_time.is_some() || spec.end_time.is_some(),
            "Applying query"
        );
        self.query = query;
        self.query_spec = spec;
        self.refresh();
        Ok(())
    }

    /// Recompute rows, top processes, and trend from the active tab and query.
    fn refresh(&mut self) {
        let tab_indices = self
            .tabs
            .get(self.active_tab)
            .map(|tab| tab.indices.as_slice())
            .unwrap_or_default();

        self.filtered_indices = if self.query_spec.is_empty() {
            tab_indices.to_vec()
        } else {
            tab_indices
                .iter()
                .copied()
                .filter(|&idx| self.query_spec.matches(&self.records[idx]))
                .collect()
        };

        let (top_processes, trend) = {
            let rows = self.filtered_records();
            (
                aggregate::top_processes(&rows, self.settings.top_n),
                aggregate::trend(&rows, self.settings.trend_buckets),
            )
        };
        self.top_processes = top_processes;
        self.trend = trend;

        tracing::debug!(
            tab = self.active_tab,
            rows = self.filtered_indices.len(),
            "Views refreshed"
        );
    }

    /// Records matching the active tab and query, in load order.
    pub fn filtered_records(&self) -> Vec<&LogRecord> {
        self.filtered_indices
            .iter()
            .filter_map(|&idx| self.records.get(idx))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ingest::load_lines;
    use crate::core::rules::load_builtin_rules;

    const SCENARIO: &[&str] = &[
        "Jan 01 10:00:00 host sshd: login failed",
        "Jan 01 10:00:05 host sshd: login success",
        "Jan 01 10:00:10 host cron: job completed",
    ];

    fn settings() -> ViewSettings {
        ViewSettings {
            top_n: 1,
            trend_buckets: 2,
            time_comparison: TimeComparison::Lexical,
        }
    }

    fn scenario_state() -> AppState {
        let loaded = load_lines(SCENARIO.iter().copied(), &load_builtin_rules());
        AppState::new(loaded.records, loaded.summary, settings())
    }

    #[test]
    fn test_tabs_partition_records() {
        let state = scenario_state();
        let names: Vec<_> = state.tabs.iter().map(Tab::name).collect();
        assert_eq!(
            names,
            vec!["Errors", "Warnings", "Informational", "Uncategorised", "All"]
        );
        assert_eq!(state.tabs[0].indices, vec![0]);
        assert_eq!(state.tabs[2].indices, vec![1, 2]);
        assert_eq!(state.tabs[4].indices.len(), 3);
        assert_eq!(state.active_tab().map(Tab::name), Some("All"));
    }

    #[test]
    fn test_initial_views() {
        let state = scenario_state();
        assert_eq!(state.filtered_indices, vec![0, 1, 2]);
        assert_eq!(state.top_processes.len(), 1);
        assert_eq!(state.top_processes[0].key, "sshd");
        assert_eq!(state.top_processes[0].count, 2);
        assert_eq!(state.trend, vec![1, 2]);
    }

    #[test]
    fn test_select_category_narrows_views() {
        let mut state = scenario_state();
        state.select_category(Some(Category::Info));
        assert_eq!(state.active_tab().map(Tab::name), Some("Informational"));
        assert_eq!(state.filtered_indices, vec![1, 2]);
        assert_eq!(state.trend.iter().sum::<usize>(), 2);

        state.select_category(None);
        assert_eq!(state.filtered_indices, vec![0, 1, 2]);
        assert!(!state.select_tab(99));
    }

    #[test]
    fn test_query_combines_with_tab() {
        let mut state = scenario_state();
        state.select_category(Some(Category::Info));
        state
            .apply_query(FilterQuery {
                process: vec!["^cron$".to_string()],
                ..Default::default()
            })
            .unwrap();
        assert_eq!(state.filtered_indices, vec![2]);
        assert_eq!(state.top_processes[0].key, "cron");
    }

    #[test]
    fn test_invalid_query_leaves_state_untouched() {
        let mut state = scenario_state();
        state
            .apply_query(FilterQuery {
                message: vec!["login".to_string()],
                ..Default::default()
            })
            .unwrap();
        let before_rows = state.filtered_indices.clone();
        let before_top = state.top_processes.clone();
        let before_trend = state.trend.clone();

        let err = state.apply_query(FilterQuery {
            message: vec!["(unclosed".to_string()],
            ..Default::default()
        });
        assert!(matches!(err, Err(FilterError::InvalidRegex { .. })));
        assert_eq!(state.filtered_indices, before_rows);
        assert_eq!(state.top_processes, before_top);
        assert_eq!(state.trend, before_trend);
        assert_eq!(state.query.message, vec!["login".to_string()]);
    }

    #[test]
    fn test_empty_result_has_zeroed_views() {
        let mut state = scenario_state();
        state
            .apply_query(FilterQuery {
                message: vec!["nothing matches this".to_string()],
                ..Default::default()
            })
            .unwrap();
        assert!(state.filtered_records().is_empty());
        assert!(state.top_processes.is_empty());
        assert_eq!(state.trend, vec![0, 0]);
    }

    #[test]
    fn test_empty_session() {
        let state = AppState::new(Vec::new(), IngestSummary::default(), settings());
        assert_eq!(state.tabs.len(), 5);
        assert!(state.filtered_indices.is_empty());
        assert_eq!(state.trend, vec![0, 0]);
    }
}
