//! End-to-end scenarios exercising the whole evaluate_strategy pipeline (calendar -> indicators ->
//! entry builder -> simulator -> scorer) against small synthetic bar matrices.

mod common;

use futures_backtester::cache::IndicatorCache;
use futures_backtester::config::BacktestConfig;
use futures_backtester::coordinator::{evaluate_strategy, CalendarContext};
use futures_backtester::model::strategy::{IndicatorReset, IndicatorSpec};
use futures_backtester::model::trade::{Direction, ExitReason};
use futures_backtester::simulator::{simulate_trade, SimulationInputs};

use common::{base_strategy, build_matrix, monotone_week, oscillating_bars, oscillating_strategy};

/// A single persistent SMA_With signal in a steady uptrend fires exactly one long entry (the
/// cooldown never clears because the signal never goes flat), and that trade rides to its profit
/// target well before the 60-minute max trade length or any calendar exit.
#[test]
fn monotone_uptrend_produces_one_long_trade_to_profit_target() {
    let bars = monotone_week(200, 100.0, 0.1);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let strategy = base_strategy();
    let cache = IndicatorCache::new(8);
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let output = evaluate_strategy(&strategy, &matrix, &ctx, &cache, &config).unwrap();

    assert!(!output.fail_strategy);
    assert_eq!(output.trades.len(), 1);
    let trade = output.trades[0];
    assert_eq!(trade.direction, Direction::Long);
    assert_eq!(trade.exit_reason, ExitReason::ProfitTarget);
    assert!(trade.trade_return() > 0.0);
}

/// Mirror image of the uptrend case: a steady downtrend makes SMA_With vote short on every
/// allowed minute, producing one short trade that rides to its profit target.
#[test]
fn monotone_downtrend_produces_one_short_trade_to_profit_target() {
    let bars = monotone_week(200, 200.0, -0.1);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let strategy = base_strategy();
    let cache = IndicatorCache::new(8);
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let output = evaluate_strategy(&strategy, &matrix, &ctx, &cache, &config).unwrap();

    assert!(!output.fail_strategy);
    assert_eq!(output.trades.len(), 1);
    let trade = output.trades[0];
    assert_eq!(trade.direction, Direction::Short);
    assert_eq!(trade.exit_reason, ExitReason::ProfitTarget);
    assert!(trade.trade_return() > 0.0);
}

/// SMA_With and SMA_Against over the same timeperiod vote opposite directions on every minute by
/// construction, so the two indicators never agree and the combined decision is always flat —
/// no trade is ever taken.
#[test]
fn opposing_indicators_never_agree_and_take_no_trades() {
    let bars = monotone_week(200, 100.0, 0.1);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let mut strategy = base_strategy();
    strategy.indicators = vec![
        IndicatorSpec::SmaWith { timeperiod: 30 },
        IndicatorSpec::SmaAgainst { timeperiod: 30 },
    ];
    let cache = IndicatorCache::new(8);
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let output = evaluate_strategy(&strategy, &matrix, &ctx, &cache, &config).unwrap();

    assert!(output.trades.is_empty());
    assert!(!output.fail_strategy);
}

/// A trade limit set to zero marks every evaluation a failed strategy and clears its trades and
/// return series, regardless of how many trades were actually realized.
#[test]
fn zero_trade_limit_fails_the_strategy_and_clears_output() {
    let bars = monotone_week(200, 100.0, 0.1);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let strategy = base_strategy();
    let cache = IndicatorCache::new(8);
    let mut config = BacktestConfig::default();
    config.limit_trade_count = 0;
    let ctx = CalendarContext::default();

    let output = evaluate_strategy(&strategy, &matrix, &ctx, &cache, &config).unwrap();

    assert!(output.fail_strategy);
    assert!(output.trades.is_empty());
    assert!(output.minute_returns.iter().all(|(_, r)| *r == 0.0));
}

/// A calendar-forced timed exit inside the max-trade-length window takes priority over the
/// max-length exit itself, landing on the earlier minute.
#[test]
fn timed_exit_inside_max_trade_length_window_wins_over_max_length() {
    // Bar 0 stands in for the decision minute; the fill (and first scanned minute) is 1.
    let bars = monotone_week(16, 100.0, 0.0);
    let mut timed_exits = vec![false; bars.len()];
    timed_exits[8] = true;

    let inputs = SimulationInputs {
        bars: &bars,
        entry_minute_index: 1,
        direction: Direction::Long,
        stoploss: 0.5,
        profit_target: 0.5,
        max_trade_length: Some(10),
        timed_exits: &timed_exits,
        next_entry_index: None,
        slippage: 0.0,
    };
    let trade = simulate_trade(0, &inputs);

    assert_eq!(trade.exit_reason, ExitReason::TimedExit);
    assert_eq!(trade.exit_minute_index, 8);
}

/// With `one_trade_per_week` set, a strategy whose signal flips direction many times within a
/// single period still only realizes its first trade; without the flag, the same period realizes
/// several.
#[test]
fn one_trade_per_week_truncates_a_period_to_its_first_trade() {
    let bars = oscillating_bars(40);
    let matrix = build_matrix(bars, IndicatorReset::Weekly);
    let cache = IndicatorCache::new(8);
    let config = BacktestConfig::default();
    let ctx = CalendarContext::default();

    let mut limited = oscillating_strategy();
    limited.one_trade_per_week = true;
    let limited_output = evaluate_strategy(&limited, &matrix, &ctx, &cache, &config).unwrap();
    assert_eq!(limited_output.trades.len(), 1);

    let mut unlimited = oscillating_strategy();
    unlimited.one_trade_per_week = false;
    let unlimited_output = evaluate_strategy(&unlimited, &matrix, &ctx, &cache, &config).unwrap();
    assert!(unlimited_output.trades.len() >= 2);
}
