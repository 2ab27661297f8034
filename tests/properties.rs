//! The universal invariants every strategy/bar-matrix combination must satisfy, independent of
//! any one scenario: matrix bookkeeping, return attribution, position exclusivity, padding
//! safety, warmup blanking, exit-priority tie-breaking, determinism, and cache transparency.

mod common;

use futures_backtester::cache::IndicatorCache;
use futures_backtester::config::BacktestConfig;
use futures_backtester::constants::default_datetime;
use futures_backtester::coordinator::{evaluate_strategy, CalendarContext};
use futures_backtester::entry_builder::{build_decisions, Decision};
use futures_backtester::indicators;
use futures_backtester::model::bar::Bar;
use futures_backtester::model::strategy::IndicatorReset;
use futures_backtester::model::strategy::IndicatorSpec;
use futures_backtester::model::trade::{Direction, ExitReason};
use futures_backtester::simulator::{simulate_trade, SimulationInputs};

use common::{base_strategy, build_matrix, monotone_week, oscillating_bars, oscillating_strategy};

/// Invariant: the flattened real-bar count always equals the sum of per-period real lengths,
/// across any mix of period sizes.
#[test]
fn matrix_invariant_holds_for_mixed_period_sizes() {
    let a = monotone_week(50, 100.0, 0.1);
    let b = monotone_week(17, 50.0, -0.2);
    let matrix = futures_backtester::model::bar::BarMatrix::build(vec![a, b], IndicatorReset::Daily);

    assert!(matrix.is_consistent());
    assert_eq!(matrix.period_offsets, vec![0, 50]);
    assert_eq!(matrix.all_datetimes.len(), 67);
}

/// The per-minute return series a full evaluation produces always sums to exactly the sum of its
/// realized trades' returns: attribution neither manufactures nor loses return.
#[test]
fn minute_returns_sum_to_total_trade_return() {
    let bars = monotone_week(200, 100.0, 0.1);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let strategy = base_strategy();
    let cache = IndicatorCache::new(8);
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let output = evaluate_strategy(&strategy, &matrix, &ctx, &cache, &config).unwrap();
    assert!(!output.trades.is_empty());

    let attributed: f64 = output.minute_returns.iter().map(|(_, r)| r).sum();
    let expected: f64 = output.trades.iter().map(|t| t.trade_return()).sum();
    assert!((attributed - expected).abs() < 1e-9);
}

/// A period never holds two overlapping positions: sorted by entry, each trade's entry minute
/// comes strictly after the previous trade's exit minute.
#[test]
fn trades_within_a_period_never_overlap() {
    let bars = oscillating_bars(40);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let strategy = oscillating_strategy();
    let cache = IndicatorCache::new(8);
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let output = evaluate_strategy(&strategy, &matrix, &ctx, &cache, &config).unwrap();
    assert!(output.trades.len() >= 2);

    for pair in output.trades.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev.period_index == next.period_index {
            assert!(next.entry_minute_index > prev.exit_minute_index);
        }
    }
}

/// No realized trade ever fills against the padding sentinel bar.
#[test]
fn no_trade_fills_against_the_padding_sentinel() {
    let bars = monotone_week(200, 100.0, 0.1);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let strategy = base_strategy();
    let cache = IndicatorCache::new(8);
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let output = evaluate_strategy(&strategy, &matrix, &ctx, &cache, &config).unwrap();
    assert!(!output.trades.is_empty());
    for trade in &output.trades {
        assert_ne!(trade.entry_datetime, default_datetime());
        assert_ne!(trade.exit_datetime, default_datetime());
    }
}

/// The first `max_lookback` minutes of a period never produce a directional decision, regardless
/// of what the raw indicator signal says once warmup blanking (already applied to the signal
/// arrays passed in here) takes effect.
#[test]
fn decisions_are_blanked_through_the_warmup_window() {
    let spec = IndicatorSpec::SmaWith { timeperiod: 30 };
    let lookback = indicators::max_lookback(&spec);

    let bars: Vec<Bar> = monotone_week(100, 100.0, 0.1);
    let (mut long, mut short) = indicators::compute_signals(&spec, &bars).unwrap();
    long[..lookback].fill(false);
    short[..lookback].fill(false);

    let allowed = vec![true; bars.len()];
    let decisions = build_decisions(bars.len(), &allowed, &[(long, short)]);

    for decision in &decisions[..lookback] {
        assert_eq!(*decision, Decision::None);
    }
}

/// When stoploss, profit target, and a timed exit are all satisfiable on the very same minute,
/// the simulator picks stoploss: Stoploss > ProfitTarget > TimedExit > MaxLength > NextEntry.
#[test]
fn simultaneous_exit_conditions_resolve_by_priority() {
    let bars = vec![
        bar(-1, 100.0, 100.5, 99.5, 100.0),
        bar(0, 100.0, 100.5, 99.5, 100.0),
        bar(1, 100.0, 100.2, 90.0, 91.0),
    ];
    let timed_exits = vec![false, false, true];
    let inputs = SimulationInputs {
        bars: &bars,
        entry_minute_index: 1,
        direction: Direction::Long,
        stoploss: 0.01,
        profit_target: 0.01,
        max_trade_length: Some(5),
        timed_exits: &timed_exits,
        next_entry_index: Some(2),
        slippage: 0.0,
    };
    let trade = simulate_trade(0, &inputs);
    assert_eq!(trade.exit_reason, ExitReason::Stoploss);
}

/// Running the same strategy over the same bar matrix twice always yields byte-identical trades:
/// the per-period fan-out is embarrassingly parallel, but folding results back by
/// `(period_index, entry_minute_index)` removes any ordering nondeterminism.
#[test]
fn evaluation_is_deterministic_across_repeated_runs() {
    let bars = oscillating_bars(40);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let strategy = oscillating_strategy();
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let cache_a = IndicatorCache::new(8);
    let first = evaluate_strategy(&strategy, &matrix, &ctx, &cache_a, &config).unwrap();

    let cache_b = IndicatorCache::new(8);
    let second = evaluate_strategy(&strategy, &matrix, &ctx, &cache_b, &config).unwrap();

    assert_eq!(first.trades, second.trades);
}

/// A cold (fresh, empty) cache and a warm cache that already holds the fingerprint produce the
/// exact same trades: caching is a performance detail, never an observable difference.
#[test]
fn cache_hit_or_miss_never_changes_the_result() {
    let bars = monotone_week(200, 100.0, 0.1);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let strategy = base_strategy();
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let bypass_cache = IndicatorCache::new(0);
    let bypassed = evaluate_strategy(&strategy, &matrix, &ctx, &bypass_cache, &config).unwrap();

    let warm_cache = IndicatorCache::new(8);
    let _ = warm_cache.get_or_compute(&strategy.indicators[0], &matrix).unwrap();
    let warmed = evaluate_strategy(&strategy, &matrix, &ctx, &warm_cache, &config).unwrap();

    assert_eq!(bypassed.trades, warmed.trades);
}

fn bar(minute: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(18, 0, 0)
        .unwrap();
    Bar {
        datetime: base + chrono::Duration::minutes(minute),
        open,
        high,
        low,
        close,
        volume: 1.0,
    }
}
