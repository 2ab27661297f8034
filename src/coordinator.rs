//! Work Coordinator (C8): orchestrates one strategy evaluation across C2-C7, fanning period-level
//! work out across a `rayon` thread pool (shared bar matrix and indicator cache held behind `Arc`,
//! read-only within a period) and then sequentially folding per-period trades and per-minute
//! returns, matching the host crate's `engine::core::run_backtest` orchestration shape.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;

use crate::cache::IndicatorCache;
use crate::calendar;
use crate::config::BacktestConfig;
use crate::entry_builder;
use crate::error::BacktestError;
use crate::indicators;
use crate::model::bar::{BarMatrix, Period};
use crate::model::strategy::Strategy;
use crate::model::trade::Trade;
use crate::scorer::{self, Scorecard};
use crate::simulator::{self, SimulationInputs};

/// Calendar facts that don't derive from the bar matrix itself: holiday dates, scheduled risk
/// events, and circuit-breaker windows, all supplied by the caller (typically loaded from the
/// bar store alongside the bars).
#[derive(Debug, Clone, Default)]
pub struct CalendarContext {
    pub holidays: Vec<NaiveDate>,
    pub risk_events: Vec<NaiveDateTime>,
    pub circuit_breaker_windows: Vec<(NaiveDateTime, NaiveDateTime)>,
}

#[derive(Debug, Clone)]
pub struct EvaluationOutput {
    pub trades: Vec<Trade>,
    pub minute_returns: Vec<(NaiveDateTime, f64)>,
    pub scorecards: Vec<Scorecard>,
    pub overall_score: f64,
    pub fail_strategy: bool,
}

struct PeriodOutcome {
    trades: Vec<Trade>,
    minute_return_deltas: Vec<(usize, f64)>,
}

pub fn evaluate_strategy(
    strategy: &Strategy,
    matrix: &BarMatrix,
    calendar_ctx: &CalendarContext,
    cache: &Arc<IndicatorCache>,
    config: &BacktestConfig,
) -> Result<EvaluationOutput, BacktestError> {
    strategy.validate_full()?;

    let matrix_signals: Vec<_> = strategy
        .indicators
        .iter()
        .map(|spec| cache.get_or_compute(spec, matrix))
        .collect::<Result<Vec<_>, _>>()?;

    let allowed_weekdays = strategy.allowed_weekday_indexes();

    let outcomes: Vec<PeriodOutcome> = matrix
        .periods
        .par_iter()
        .enumerate()
        .map(|(period_index, period)| {
            evaluate_period(
                period_index,
                period,
                matrix.period_offsets[period_index],
                strategy,
                &allowed_weekdays,
                calendar_ctx,
                &matrix_signals,
                config,
            )
        })
        .collect();

    let mut trades = Vec::new();
    let mut minute_returns = vec![0.0_f64; matrix.all_datetimes.len()];
    for outcome in outcomes {
        trades.extend(outcome.trades);
        for (i, r) in outcome.minute_return_deltas {
            minute_returns[i] += r;
        }
    }

    // Realized trades are produced in parallel per period; sort by entry time so downstream
    // consumers (the scorer's weekly/daily peak counts, `last_exit_index` style sequencing in
    // tests) see a stable chronological order regardless of which period finished first.
    trades.sort_by_key(|t| (t.period_index, t.entry_minute_index));

    let fail_strategy = trades.len() >= config.limit_trade_count;
    if fail_strategy {
        tracing::warn!(
            trade_count = trades.len(),
            limit = config.limit_trade_count,
            "strategy exceeded trade limit, reporting as failed"
        );
        trades.clear();
        minute_returns.iter_mut().for_each(|r| *r = 0.0);
    }

    let minute_returns_dated: Vec<(NaiveDateTime, f64)> = matrix
        .all_datetimes
        .iter()
        .copied()
        .zip(minute_returns)
        .collect();

    let scorecards = scorer::compute_scorecards(&trades, &minute_returns_dated, config);
    let all_time = scorecards
        .iter()
        .find(|c| c.window_weeks == 0)
        .expect("SCORE_WINDOWS_WEEKS always includes 0");
    let overall_score = scorer::overall_score(all_time, &config.score_weights);

    Ok(EvaluationOutput {
        trades,
        minute_returns: minute_returns_dated,
        scorecards,
        overall_score,
        fail_strategy,
    })
}

#[allow(clippy::too_many_arguments)]
fn evaluate_period(
    period_index: usize,
    period: &Period,
    period_offset: usize,
    strategy: &Strategy,
    allowed_weekdays: &[usize],
    calendar_ctx: &CalendarContext,
    matrix_signals: &[crate::cache::MatrixSignals],
    config: &BacktestConfig,
) -> PeriodOutcome {
    let bars = &period.bars[..period.length];
    if bars.len() < 2 {
        return PeriodOutcome {
            trades: Vec::new(),
            minute_return_deltas: Vec::new(),
        };
    }
    let datetimes: Vec<NaiveDateTime> = bars.iter().map(|b| b.datetime).collect();

    let timed_exits = calendar::union_exits(&[
        calendar::create_end_of_day_exits(&datetimes),
        calendar::create_session_end_exits(&datetimes, strategy.session),
        calendar::create_holidays_exits(&datetimes, &calendar_ctx.holidays),
        calendar::create_risk_events_exits(&datetimes, &calendar_ctx.risk_events),
        calendar::create_circuit_breaker_exits(&datetimes, &calendar_ctx.circuit_breaker_windows),
    ]);

    let session_entries = calendar::create_session_entries(&datetimes, strategy.session);
    let allowed_days = calendar::create_allowed_days(&datetimes, allowed_weekdays);
    let mut allowed_entries = calendar::intersect(&session_entries, &allowed_days);
    if let Some(len) = strategy.max_trade_length {
        allowed_entries = calendar::create_before_timed_entries(&allowed_entries, &timed_exits, len);
    }

    let signals: Vec<(Vec<bool>, Vec<bool>)> = strategy
        .indicators
        .iter()
        .zip(matrix_signals.iter())
        .map(|(spec, matrix_signal)| {
            let (mut long, mut short) = matrix_signal[period_index].clone();
            let lookback = indicators::max_lookback(spec).min(long.len());
            long[..lookback].fill(false);
            short[..lookback].fill(false);
            (long, short)
        })
        .collect();

    let decisions = entry_builder::build_decisions(period.length, &allowed_entries, &signals);

    let entry_indexes: Vec<usize> = decisions
        .iter()
        .enumerate()
        .filter_map(|(i, d)| d.direction().map(|_| i))
        .collect();

    let mut trades = Vec::new();
    let mut minute_return_deltas = Vec::new();
    let mut last_exit_index: Option<usize> = None;

    for (rank, &m) in entry_indexes.iter().enumerate() {
        if strategy.one_trade_per_week && !trades.is_empty() {
            break;
        }
        if last_exit_index.is_some_and(|last| m < last) {
            continue;
        }
        let entry_minute_index = m + 1;
        if entry_minute_index >= bars.len() {
            continue;
        }

        let direction = decisions[m].direction().expect("filtered to directional decisions");
        let next_entry_index = if strategy.take_every_signal {
            entry_indexes.get(rank + 1).copied()
        } else {
            None
        };

        let inputs = SimulationInputs {
            bars,
            entry_minute_index,
            direction,
            stoploss: strategy.stoploss,
            profit_target: strategy.profit_target,
            max_trade_length: strategy.max_trade_length,
            timed_exits: &timed_exits,
            next_entry_index,
            slippage: config.slippage,
        };
        let trade = simulator::simulate_trade(period_index, &inputs);
        last_exit_index = Some(trade.exit_minute_index);

        let mut local_returns = vec![0.0_f64; bars.len()];
        simulator::attribute_minute_returns(&trade, bars, 0, &mut local_returns);
        minute_return_deltas.extend(
            local_returns
                .into_iter()
                .enumerate()
                .filter(|&(_, r)| r != 0.0)
                .map(|(i, r)| (period_offset + i, r)),
        );

        trades.push(trade);
    }

    PeriodOutcome {
        trades,
        minute_return_deltas,
    }
}
