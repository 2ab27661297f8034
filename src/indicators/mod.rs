//! Indicator Library (C3): a closed registry turning an `IndicatorSpec` plus one period's real
//! bars into a `(long, short)` boolean pair of the same length as the bars, modeled on
//! `signals::registry::build_signal`'s dispatch-by-name pattern but over a closed enum instead of
//! a dynamic name string.

pub mod moving_average;
pub mod oscillator;
pub mod volatility;

use crate::error::BacktestError;
use crate::model::bar::Bar;
use crate::model::strategy::IndicatorSpec;

/// Lookback (in minutes) an indicator needs before it produces its first real signal. Minutes
/// `0..max_lookback` are blanked out by the entry builder regardless of what the indicator itself
/// reports (spec §4.5 "max-lookback blanking").
pub fn max_lookback(spec: &IndicatorSpec) -> usize {
    match spec {
        IndicatorSpec::SmaWith { timeperiod } | IndicatorSpec::SmaAgainst { timeperiod } => {
            moving_average::max_lookback_sma(*timeperiod)
        }
        IndicatorSpec::EmaWith { timeperiod } | IndicatorSpec::EmaAgainst { timeperiod } => {
            moving_average::max_lookback_ema(*timeperiod)
        }
        IndicatorSpec::SmaCrossoverWith { fast_period, slow_period }
        | IndicatorSpec::SmaCrossoverAgainst { fast_period, slow_period }
        | IndicatorSpec::EmaCrossoverWith { fast_period, slow_period }
        | IndicatorSpec::EmaCrossoverAgainst { fast_period, slow_period } => {
            moving_average::max_lookback_crossover(*fast_period, *slow_period)
        }
        IndicatorSpec::RsiWith { timeperiod, .. } | IndicatorSpec::RsiAgainst { timeperiod, .. } => {
            oscillator::max_lookback_rsi(*timeperiod)
        }
        IndicatorSpec::AtrBreakoutWith { timeperiod, .. }
        | IndicatorSpec::AtrBreakoutAgainst { timeperiod, .. } => {
            volatility::max_lookback_atr_breakout(*timeperiod)
        }
    }
}

/// Compute the `(long, short)` signal pair for one period's real bars. Returned vectors are
/// always `bars.len()` long; callers must still apply `max_lookback` blanking themselves since an
/// indicator's own internal warm-up (all-`false` prefix) isn't guaranteed to match the registry's
/// declared `max_lookback` once multiple indicators are combined.
pub fn compute_signals(spec: &IndicatorSpec, bars: &[Bar]) -> Result<(Vec<bool>, Vec<bool>), BacktestError> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let (long, short) = match spec {
        IndicatorSpec::SmaWith { timeperiod } => moving_average::sma_with(&closes, *timeperiod),
        IndicatorSpec::SmaAgainst { timeperiod } => moving_average::sma_against(&closes, *timeperiod),
        IndicatorSpec::EmaWith { timeperiod } => moving_average::ema_with(&closes, *timeperiod),
        IndicatorSpec::EmaAgainst { timeperiod } => moving_average::ema_against(&closes, *timeperiod),
        IndicatorSpec::SmaCrossoverWith { fast_period, slow_period } => {
            moving_average::sma_crossover_with(&closes, *fast_period, *slow_period)
        }
        IndicatorSpec::SmaCrossoverAgainst { fast_period, slow_period } => {
            moving_average::sma_crossover_against(&closes, *fast_period, *slow_period)
        }
        IndicatorSpec::EmaCrossoverWith { fast_period, slow_period } => {
            moving_average::ema_crossover_with(&closes, *fast_period, *slow_period)
        }
        IndicatorSpec::EmaCrossoverAgainst { fast_period, slow_period } => {
            moving_average::ema_crossover_against(&closes, *fast_period, *slow_period)
        }
        IndicatorSpec::RsiWith { timeperiod, oversold, overbought } => {
            oscillator::rsi_with(&closes, *timeperiod, *oversold, *overbought)
        }
        IndicatorSpec::RsiAgainst { timeperiod, oversold, overbought } => {
            oscillator::rsi_against(&closes, *timeperiod, *oversold, *overbought)
        }
        IndicatorSpec::AtrBreakoutWith { timeperiod, multiplier } => {
            let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
            let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
            volatility::atr_breakout_with(&highs, &lows, &closes, *timeperiod, *multiplier)
        }
        IndicatorSpec::AtrBreakoutAgainst { timeperiod, multiplier } => {
            let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
            let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
            volatility::atr_breakout_against(&highs, &lows, &closes, *timeperiod, *multiplier)
        }
    };

    if long.len() != short.len() {
        return Err(BacktestError::IndicatorShapeMismatch {
            name: spec.name().to_string(),
            long_len: long.len(),
            short_len: short.len(),
        });
    }

    Ok((long, short))
}
