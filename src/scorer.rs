//! Scorer (C7): turns a strategy's realized trades and per-minute return series into a scorecard
//! per lookback window, generalizing the host crate's single-window Sharpe/Sortino/drawdown
//! metrics (`engine::metrics::calculate_metrics`) across `SCORE_WINDOWS_WEEKS` and adding the
//! trade-skew (`tawal`), attribution-check (`nmr`), and edge (`edge_better_than_random`) fields.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::config::BacktestConfig;
use crate::constants::{MIN_CALENDAR_DAYS_FOR_ANNUALIZED, SCORE_WINDOWS_WEEKS, WEEKS_PER_YEAR};
use crate::model::trade::{ExitReason, Trade};

#[derive(Debug, Clone, Copy, Default)]
pub struct Scorecard {
    pub window_weeks: u32,
    pub trade_count: usize,
    pub trade_win_count: usize,
    pub trade_win_rate: f64,
    pub trade_win_over_loss: f64,
    pub average_trade: f64,
    pub min_sharpes: f64,
    pub tawal: f64,
    pub nmr: f64,
    pub edge_better_than_random: f64,
    pub profit_target_pct: f64,
    pub stoploss_pct: f64,
    pub cost_pct: f64,
    pub max_weekly_trade_count: usize,
    pub max_daily_trade_count: usize,
}

/// Compute one scorecard per entry of `SCORE_WINDOWS_WEEKS`, in that order (so index 0 is
/// all-time).
pub fn compute_scorecards(
    trades: &[Trade],
    minute_returns: &[(NaiveDateTime, f64)],
    config: &BacktestConfig,
) -> Vec<Scorecard> {
    let latest = trades
        .iter()
        .map(|t| t.exit_datetime)
        .chain(minute_returns.iter().map(|(dt, _)| *dt))
        .max();

    SCORE_WINDOWS_WEEKS
        .iter()
        .map(|&w| compute_one_window(trades, minute_returns, config, w, latest))
        .collect()
}

fn compute_one_window(
    trades: &[Trade],
    minute_returns: &[(NaiveDateTime, f64)],
    config: &BacktestConfig,
    window_weeks: u32,
    latest: Option<NaiveDateTime>,
) -> Scorecard {
    let Some(latest) = latest else {
        return Scorecard {
            window_weeks,
            ..Default::default()
        };
    };

    let cutoff = if window_weeks == 0 {
        None
    } else {
        Some(latest - chrono::Duration::weeks(i64::from(window_weeks)))
    };

    let windowed_trades: Vec<&Trade> = trades
        .iter()
        .filter(|t| cutoff.map_or(true, |c| t.exit_datetime >= c))
        .collect();
    let windowed_returns: Vec<f64> = minute_returns
        .iter()
        .filter(|(dt, _)| cutoff.map_or(true, |c| *dt >= c))
        .map(|(_, r)| *r)
        .collect();

    let trade_count = windowed_trades.len();
    let returns: Vec<f64> = windowed_trades.iter().map(|t| t.trade_return()).collect();

    let winners: Vec<f64> = returns.iter().copied().filter(|&r| r > 0.0).collect();
    let losers: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let trade_win_count = winners.len();

    let trade_win_rate = if trade_count > 0 {
        trade_win_count as f64 / trade_count as f64
    } else {
        0.0
    };

    let avg_winner = mean(&winners);
    let avg_loser_abs = mean(&losers).abs();
    let trade_win_over_loss = if avg_loser_abs > 0.0 {
        avg_winner / avg_loser_abs
    } else if avg_winner > 0.0 {
        f64::INFINITY
    } else {
        0.0
    };

    let average_trade = mean(&returns);

    let tawal = trade_win_rate * trade_win_over_loss - (1.0 - trade_win_rate);

    let nmr = windowed_returns.iter().sum::<f64>() - returns.iter().sum::<f64>();

    let edge_better_than_random = if trade_win_over_loss.is_finite() {
        trade_win_rate - 1.0 / (1.0 + trade_win_over_loss)
    } else {
        trade_win_rate
    };

    let calendar_days = windowed_returns.len().max(windowed_trades.len()) as i64 / (24 * 60);
    let min_sharpes = if calendar_days >= config.min_calendar_days_for_annualized {
        hourly_sharpe(minute_returns, cutoff)
    } else {
        0.0
    };

    let profit_target_pct = exit_reason_fraction(&windowed_trades, ExitReason::ProfitTarget);
    let stoploss_pct = exit_reason_fraction(&windowed_trades, ExitReason::Stoploss);

    let cost_pct = cost_fraction(&windowed_trades);

    let (max_weekly_trade_count, max_daily_trade_count) = trade_count_peaks(&windowed_trades);

    Scorecard {
        window_weeks,
        trade_count,
        trade_win_count,
        trade_win_rate,
        trade_win_over_loss,
        average_trade,
        min_sharpes,
        tawal,
        nmr,
        edge_better_than_random,
        profit_target_pct,
        stoploss_pct,
        cost_pct,
        max_weekly_trade_count,
        max_daily_trade_count,
    }
}

fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        0.0
    } else {
        xs.iter().sum::<f64>() / xs.len() as f64
    }
}

fn std_dev(xs: &[f64]) -> f64 {
    if xs.len() < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64;
    variance.sqrt()
}

/// Resample the per-minute return series to hourly buckets and compute an annualized Sharpe-like
/// ratio, `sqrt(WEEKS_PER_YEAR)`-scaled per §4.7.
fn hourly_sharpe(minute_returns: &[(NaiveDateTime, f64)], cutoff: Option<NaiveDateTime>) -> f64 {
    let mut buckets: BTreeMap<(i32, u32, u32, u32), f64> = BTreeMap::new();
    for (dt, r) in minute_returns {
        if cutoff.is_some_and(|c| *dt < c) {
            continue;
        }
        let key = (dt.year(), dt.ordinal(), dt.hour(), 0);
        *buckets.entry(key).or_insert(0.0) += r;
    }
    let hourly: Vec<f64> = buckets.into_values().collect();
    let mean_r = mean(&hourly);
    let std_r = std_dev(&hourly);
    if std_r > 0.0 {
        mean_r / std_r * WEEKS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}

fn exit_reason_fraction(trades: &[&Trade], reason: ExitReason) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let matching = trades.iter().filter(|t| t.exit_reason == reason).count();
    matching as f64 / trades.len() as f64
}

fn cost_fraction(trades: &[&Trade]) -> f64 {
    let mut cost = 0.0;
    let mut turnover = 0.0;
    for t in trades {
        cost += (t.entry_price - t.entry_price_raw).abs() + (t.exit_price - t.exit_price_raw).abs();
        turnover += t.entry_price_raw + t.exit_price_raw;
    }
    if turnover > 0.0 {
        cost / turnover
    } else {
        0.0
    }
}

fn trade_count_peaks(trades: &[&Trade]) -> (usize, usize) {
    let mut by_week: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    let mut by_day: BTreeMap<chrono::NaiveDate, usize> = BTreeMap::new();

    for t in trades {
        let week_key = (t.entry_datetime.iso_week().year(), t.entry_datetime.iso_week().week());
        *by_week.entry(week_key).or_insert(0) += 1;
        *by_day.entry(t.entry_datetime.date()).or_insert(0) += 1;
    }

    (
        by_week.values().copied().max().unwrap_or(0),
        by_day.values().copied().max().unwrap_or(0),
    )
}

/// Weighted combination of the all-time (`w=0`) scorecard, per §4.7/§10.3.
pub fn overall_score(all_time: &Scorecard, weights: &crate::config::ScoreWeights) -> f64 {
    weights.min_sharpes * all_time.min_sharpes
        + weights.tawal * all_time.tawal
        + weights.edge_better_than_random * all_time.edge_better_than_random
        + weights.trade_win_rate * all_time.trade_win_rate
}
