//! Shared synthetic-bar-matrix builders for the end-to-end scenario tests (spec §8's E1-E6).

use chrono::{Duration, NaiveDate};
use futures_backtester::model::bar::{Bar, BarMatrix};
use futures_backtester::model::strategy::{IndicatorReset, IndicatorSpec, Session, Strategy};

/// One week of monotone-trend minute bars: `close[i] = base + step*i`, `high = close + spread`,
/// `low = close - spread`, `open = previous close` (so the very first bar's open equals its own
/// close, same as the original E1/E2 fixtures). `minutes` real bars starting at Sunday 17:00 plus
/// one hour so the first entries fall inside the "All" session.
pub fn monotone_week(minutes: usize, base: f64, step: f64) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 7)
        .expect("valid date")
        .and_hms_opt(18, 0, 0)
        .expect("valid time");

    let closes: Vec<f64> = (0..minutes).map(|i| base + step * i as f64).collect();
    (0..minutes)
        .map(|i| {
            let close = closes[i];
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                datetime: start + Duration::minutes(i as i64),
                open,
                high: close.max(open) + 0.01,
                low: close.min(open) - 0.01,
                close,
                volume: 1.0,
            }
        })
        .collect()
}

pub fn build_matrix(bars: Vec<Bar>, reset: IndicatorReset) -> BarMatrix {
    BarMatrix::build(vec![bars], reset)
}

pub fn base_strategy() -> Strategy {
    Strategy {
        stoploss: 0.01,
        profit_target: 0.02,
        session: Session::All,
        max_trade_length: Some(60),
        monday: true,
        tuesday: true,
        wednesday: true,
        thursday: true,
        friday: true,
        take_every_signal: true,
        one_trade_per_week: false,
        indicator_reset: IndicatorReset::Weekly,
        indicators: vec![IndicatorSpec::SmaWith { timeperiod: 30 }],
    }
}

/// Repeating 5-minute zigzag (four flat minutes at 10.0 then one spike to 20.0) over a fast=1
/// slow=3 SMA crossover flips direction on nearly every spike and reversion, producing several
/// non-overlapping trades in a single short period.
pub fn oscillating_bars(minutes: usize) -> Vec<Bar> {
    let bars = monotone_week(minutes, 0.0, 0.0);
    bars.into_iter()
        .enumerate()
        .map(|(i, mut b)| {
            let close = if i % 5 == 4 { 20.0 } else { 10.0 };
            b.close = close;
            b.open = close;
            b.high = close + 0.01;
            b.low = close - 0.01;
            b
        })
        .collect()
}

pub fn oscillating_strategy() -> Strategy {
    Strategy {
        stoploss: 0.01,
        profit_target: 0.02,
        session: Session::All,
        max_trade_length: None,
        monday: true,
        tuesday: true,
        wednesday: true,
        thursday: true,
        friday: true,
        take_every_signal: true,
        one_trade_per_week: false,
        indicator_reset: IndicatorReset::Weekly,
        indicators: vec![IndicatorSpec::SmaCrossoverWith {
            fast_period: 1,
            slow_period: 3,
        }],
    }
}
