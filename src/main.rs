// LogScope - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Rule table selection (built-in or user file)
// 4. Loading sources, applying the query, printing the report, exporting

use logscope::app;
use logscope::core;
use logscope::platform;
use logscope::util;

use clap::Parser;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use util::error::{LogScopeError, Result};

/// LogScope - Syslog categoriser and analyser.
///
/// Reads syslog-style lines from files, glob patterns, or stdin, sorts every
/// record into Errors, Warnings, Informational, or Uncategorised, and prints
/// the filtered rows with the busiest processes and a volume trend.
#[derive(Parser, Debug)]
#[command(name = "logscope", version, about)]
struct Cli {
    /// Log files or glob patterns to read, in order ("-" or none for stdin).
    paths: Vec<String>,

    /// Message pattern (regex). Repeat to require several.
    #[arg(short = 'm', long = "message")]
    message: Vec<String>,

    /// Process pattern (regex). Repeat to require several.
    #[arg(short = 'p', long = "process")]
    process: Vec<String>,

    /// Inclusive start time, "Mon DD HH:MM:SS".
    #[arg(short = 's', long = "start")]
    start: Option<String>,

    /// Inclusive end time, "Mon DD HH:MM:SS".
    #[arg(short = 'e', long = "end")]
    end: Option<String>,

    /// Category tab to show: error, warn, info, misc, or all.
    #[arg(short = 'c', long = "category", default_value = "all")]
    category: String,

    /// Compare time bounds as points in time instead of as text.
    #[arg(long = "chronological")]
    chronological: bool,

    /// Number of entries in the top-processes table.
    #[arg(short = 'n', long = "top")]
    top: Option<usize>,

    /// Number of trend buckets.
    #[arg(short = 'b', long = "buckets")]
    buckets: Option<usize>,

    /// Rules file replacing the built-in categorisation rules.
    #[arg(short = 'r', long = "rules")]
    rules: Option<PathBuf>,

    /// Config file to use instead of the platform config.toml.
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Write the filtered rows to a .csv or .json file.
    #[arg(long = "export")]
    export: Option<PathBuf>,

    /// Maximum number of rows to print.
    #[arg(long = "limit")]
    limit: Option<usize>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    // Resolve platform paths
    let platform_paths = platform::config::PlatformPaths::resolve();

    // Config is read before logging starts so its [logging] level applies.
    // Events emitted while loading have no subscriber yet; the outcome is
    // logged again once logging is up.
    let (config_path, config_required) = config_source(&cli, &platform_paths);
    let loaded_config = platform::config::load_config(config_path, config_required);
    let config_level = loaded_config
        .as_ref()
        .ok()
        .and_then(|(config, _)| config.log_level.as_deref());

    // Initialise logging subsystem
    util::logging::init(cli.debug, config_level);

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "LogScope starting"
    );
    tracing::debug!(
        config_dir = %platform_paths.config_dir.display(),
        rules = %platform_paths.rules_file.display(),
        "Platform paths resolved"
    );
    match loaded_config {
        Ok((ref config, ref warnings)) => tracing::info!(
            path = %config_path.display(),
            exists = config_path.exists(),
            warnings = warnings.len(),
            rules_file = ?config.rules_file,
            "Configuration loaded"
        ),
        Err(ref e) => {
            tracing::debug!(path = %config_path.display(), error = %e, "Configuration failed")
        }
    }

    let result = loaded_config
        .map_err(LogScopeError::from)
        .and_then(|(config, warnings)| run(&cli, &platform_paths, config, warnings));

    if let Err(e) = result {
        tracing::error!(error = %e, "Fatal error");
        eprintln!("Error: {e}");
        let mut cause = std::error::Error::source(&e);
        while let Some(inner) = cause {
            eprintln!("  caused by: {inner}");
            cause = std::error::Error::source(inner);
        }
        std::process::exit(1);
    }
}

fn run(
    cli: &Cli,
    paths: &platform::config::PlatformPaths,
    config: platform::config::AppConfig,
    config_warnings: Vec<String>,
) -> Result<()> {
    for warning in &config_warnings {
        tracing::warn!("{}", warning);
    }

    let settings = app::state::ViewSettings {
        top_n: bounded("--top", cli.top, config.top_n, util::constants::MAX_TOP_N),
        trend_buckets: bounded(
            "--buckets",
            cli.buckets,
            config.trend_buckets,
            util::constants::MAX_TREND_BUCKETS,
        ),
        time_comparison: if cli.chronological {
            core::filter::TimeComparison::Chronological
        } else {
            config.time_comparison
        },
    };
    let row_limit = bounded(
        "--limit",
        cli.limit,
        config.row_limit,
        util::constants::MAX_ROW_LIMIT,
    );

    // Category and query are validated before any source is read.
    let category = match cli.category.trim().to_lowercase().as_str() {
        "all" | "" => None,
        other => Some(other.parse::<core::model::Category>()?),
    };
    let query = core::filter::FilterQuery {
        name: "Query".to_string(),
        message: cli.message.clone(),
        process: cli.process.clone(),
        start_time: cli.start.clone(),
        end_time: cli.end.clone(),
        category: None,
    };
    query.compile(settings.time_comparison)?;
    if let Some(ref path) = cli.export {
        core::export::ExportFormat::from_path(path)?;
    }

    // Rules: CLI override > config > platform rules.toml > built-in
    let explicit_rules = cli.rules.as_deref().or(config.rules_file.as_deref());
    let (categorizer, rule_errors) =
        app::rules_mgr::load_rules(explicit_rules, Some(&paths.rules_file));
    for err in &rule_errors {
        eprintln!("Warning: {err}. Using built-in rules.");
    }

    let sources = app::ingest::resolve_sources(&cli.paths)?;
    let loaded = app::ingest::load_sources(&sources, &categorizer);

    let mut state = app::state::AppState::new(loaded.records, loaded.summary, settings);
    state.select_category(category);
    state.apply_query(query)?;

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    app::report::render(&state, &mut out, row_limit)
        .and_then(|()| out.flush())
        .map_err(LogScopeError::Output)?;

    if let Some(ref path) = cli.export {
        let records = state.filtered_records();
        let count = core::export::export_to_file(&records, path)?;
        eprintln!("Exported {count} records to {}", path.display());
    }

    Ok(())
}

/// The config file to load and whether it must exist: an explicit
/// `--config` is required, the platform config.toml is optional.
fn config_source<'a>(
    cli: &'a Cli,
    paths: &'a platform::config::PlatformPaths,
) -> (&'a Path, bool) {
    match cli.config {
        Some(ref path) => (path.as_path(), true),
        None => (paths.config_file.as_path(), false),
    }
}

/// Pick the CLI value over the config value. A CLI value outside `1..=max`
/// is rejected the same way config.toml rejects it, keeping the config value.
fn bounded(flag: &str, cli_value: Option<usize>, config_value: usize, max: usize) -> usize {
    match cli_value {
        Some(value) if (1..=max).contains(&value) => value,
        Some(value) => {
            tracing::warn!(
                flag,
                value,
                max,
                fallback = config_value,
                "Value out of range; using configured value"
            );
            config_value
        }
        None => config_value,
    }
}
