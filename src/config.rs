//! Immutable configuration structs. Built once (via `Default` plus optional overrides) and
//! threaded through the coordinator; nothing here is read from process-wide mutable state.

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::constants::{DEFAULT_LIMIT_TRADE_COUNT, MIN_CALENDAR_DAYS_FOR_ANNUALIZED};

/// Score weights applied to the all-time (`w=0`) scorecard to produce the overall `score`.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub min_sharpes: f64,
    pub tawal: f64,
    pub edge_better_than_random: f64,
    pub trade_win_rate: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            min_sharpes: 0.4,
            tawal: 0.3,
            edge_better_than_random: 0.2,
            trade_win_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Multiplicative slippage factor applied to entry/exit fills.
    pub slippage: f64,
    /// Trade count above which an evaluation self-aborts as a failed strategy.
    pub limit_trade_count: usize,
    /// Number of fingerprint slots held by the indicator cache.
    pub indicator_cache_capacity: usize,
    pub score_weights: ScoreWeights,
    pub min_calendar_days_for_annualized: i64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            slippage: 0.0005,
            limit_trade_count: DEFAULT_LIMIT_TRADE_COUNT,
            indicator_cache_capacity: 256,
            score_weights: ScoreWeights::default(),
            min_calendar_days_for_annualized: MIN_CALENDAR_DAYS_FOR_ANNUALIZED,
        }
    }
}

/// Subset of `BacktestConfig` that may be overridden from a TOML file; any field left out keeps
/// the `Default::default()` value. Score weights are all-or-nothing — a partial weights table
/// would silently change what the other weights mean.
#[derive(Debug, Deserialize, Default)]
struct ConfigOverrides {
    slippage: Option<f64>,
    limit_trade_count: Option<usize>,
    indicator_cache_capacity: Option<usize>,
    min_calendar_days_for_annualized: Option<i64>,
    score_weights: Option<ScoreWeightsTable>,
}

#[derive(Debug, Deserialize)]
struct ScoreWeightsTable {
    min_sharpes: f64,
    tawal: f64,
    edge_better_than_random: f64,
    trade_win_rate: f64,
}

impl BacktestConfig {
    /// Load `Default::default()` overridden by whatever fields are present in the TOML file at
    /// `path`. Used by the CLI to let an operator tune slippage/limits/weights without a
    /// recompile, mirroring the host crate's pattern of keeping tunables out of code.
    pub fn from_toml_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading config file {path}"))?;
        let overrides: ConfigOverrides =
            toml::from_str(&text).with_context(|| format!("parsing config file {path}"))?;
        let mut config = Self::default();
        if let Some(slippage) = overrides.slippage {
            config.slippage = slippage;
        }
        if let Some(limit) = overrides.limit_trade_count {
            config.limit_trade_count = limit;
        }
        if let Some(capacity) = overrides.indicator_cache_capacity {
            config.indicator_cache_capacity = capacity;
        }
        if let Some(days) = overrides.min_calendar_days_for_annualized {
            config.min_calendar_days_for_annualized = days;
        }
        if let Some(w) = overrides.score_weights {
            config.score_weights = ScoreWeights {
                min_sharpes: w.min_sharpes,
                tawal: w.tawal,
                edge_better_than_random: w.edge_better_than_random,
                trade_win_rate: w.trade_win_rate,
            };
        }
        Ok(config)
    }
}

/// Connection details for the bar/strategy store, loaded from the environment.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub sqlite_path: String,
}

impl StoreConfig {
    /// Build from environment variables, loading a `.env` file first if present.
    ///
    /// | Env Var | Default | Purpose |
    /// |---------|---------|---------|
    /// | `BARS_DB_PATH` | `./bars.sqlite3` | Path to the SQLite bar/holiday/risk-event store |
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let sqlite_path =
            std::env::var("BARS_DB_PATH").unwrap_or_else(|_| "./bars.sqlite3".to_string());
        Self { sqlite_path }
    }
}
