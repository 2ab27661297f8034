//! Thin CLI entry point (§10.6): loads a strategy definition and a date range, runs one
//! evaluation against the configured bar store, and prints the resulting scorecard. Mirrors the
//! host crate's `main.rs` shape (`tracing_subscriber` init, a thin consumer of library modules)
//! minus the MCP/HTTP server machinery, which this repo has no analogue for.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use futures_backtester::cache::IndicatorCache;
use futures_backtester::config::{BacktestConfig, StoreConfig};
use futures_backtester::coordinator::{self, CalendarContext};
use futures_backtester::model::bar::BarMatrix;
use futures_backtester::model::strategy::Strategy;
use futures_backtester::store::sqlite::SqliteBarStore;
use futures_backtester::store::BarStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Intraday futures strategy backtester")]
struct Args {
    /// Path to a JSON file matching the `Strategy` schema.
    #[arg(short, long)]
    strategy: String,

    /// Market symbol to evaluate against (must already be loaded into the bar store).
    #[arg(short, long)]
    market: String,

    /// Start of the evaluation range, inclusive (YYYY-MM-DD).
    #[arg(long)]
    start: NaiveDate,

    /// End of the evaluation range, inclusive (YYYY-MM-DD).
    #[arg(long)]
    end: NaiveDate,

    /// Path to the SQLite bar store; defaults to `BARS_DB_PATH` (or `./bars.sqlite3`).
    #[arg(long)]
    db: Option<String>,

    /// Optional TOML file overriding slippage/limits/score weights.
    #[arg(long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let strategy_json = std::fs::read_to_string(&args.strategy)
        .with_context(|| format!("reading strategy file {}", args.strategy))?;
    let strategy: Strategy =
        serde_json::from_str(&strategy_json).context("parsing strategy JSON")?;
    strategy
        .validate_full()
        .map_err(|e| anyhow::anyhow!("invalid strategy: {e}"))?;

    let config = match &args.config {
        Some(path) => BacktestConfig::from_toml_file(path)?,
        None => BacktestConfig::default(),
    };

    let db_path = args.db.unwrap_or_else(|| StoreConfig::from_env().sqlite_path);
    let store = SqliteBarStore::open(&db_path).context("opening bar store")?;

    let groups = store
        .load_bar_groups(&args.market, args.start, args.end)
        .with_context(|| format!("loading bars for {} in {}..{}", args.market, args.start, args.end))?;
    let matrix = BarMatrix::build(groups, strategy.indicator_reset);

    let calendar_ctx = CalendarContext {
        holidays: store.holidays(&args.market)?,
        risk_events: store.risk_events(&args.market)?,
        circuit_breaker_windows: store.circuit_breaker_windows(&args.market)?,
    };

    let cache = IndicatorCache::new(config.indicator_cache_capacity);

    let output = coordinator::evaluate_strategy(&strategy, &matrix, &calendar_ctx, &cache, &config)
        .map_err(|e| anyhow::anyhow!("evaluation failed: {e}"))?;

    if output.fail_strategy {
        tracing::warn!("strategy exceeded the trade limit and was marked failed");
    }

    let all_time = output
        .scorecards
        .iter()
        .find(|c| c.window_weeks == 0)
        .expect("all-time window is always present");

    println!(
        "{}",
        serde_json::to_string_pretty(&CliReport {
            trade_count: output.trades.len(),
            fail_strategy: output.fail_strategy,
            overall_score: output.overall_score,
            all_time_trade_win_rate: all_time.trade_win_rate,
            all_time_tawal: all_time.tawal,
            all_time_min_sharpes: all_time.min_sharpes,
        })
        .expect("report always serializes")
    );

    Ok(())
}

#[derive(serde::Serialize)]
struct CliReport {
    trade_count: usize,
    fail_strategy: bool,
    overall_score: f64,
    all_time_trade_win_rate: f64,
    all_time_tawal: f64,
    all_time_min_sharpes: f64,
}
