//! SMA/EMA and their crossover variants. "With" trades in the direction the average implies;
//! "Against" takes the opposite side (mean-reversion against the same signal).

use rust_ti::standard_indicators::bulk::{exponential_moving_average, simple_moving_average};

/// Right-align a shorter indicator series (length `closes.len() - lookback + 1`) against the full
/// close series, front-padding with `None` for the minutes before the indicator has enough
/// history.
fn right_align(values: Vec<f64>, total_len: usize) -> Vec<Option<f64>> {
    let lookback = total_len - values.len();
    let mut out = vec![None; lookback];
    out.extend(values.into_iter().map(Some));
    out
}

pub fn max_lookback_sma(timeperiod: usize) -> usize {
    timeperiod.saturating_sub(1)
}

pub fn max_lookback_ema(timeperiod: usize) -> usize {
    timeperiod.saturating_sub(1)
}

pub fn max_lookback_crossover(fast_period: usize, slow_period: usize) -> usize {
    fast_period.max(slow_period).saturating_sub(1)
}

fn sma_series(closes: &[f64], timeperiod: usize) -> Vec<Option<f64>> {
    if closes.len() < timeperiod {
        return vec![None; closes.len()];
    }
    right_align(simple_moving_average(closes, timeperiod), closes.len())
}

fn ema_series(closes: &[f64], timeperiod: usize) -> Vec<Option<f64>> {
    if closes.len() < timeperiod {
        return vec![None; closes.len()];
    }
    right_align(exponential_moving_average(closes, timeperiod), closes.len())
}

/// `close` above the average signals long, below signals short.
pub fn sma_with(closes: &[f64], timeperiod: usize) -> (Vec<bool>, Vec<bool>) {
    let avg = sma_series(closes, timeperiod);
    directional_pairs(closes, &avg, false)
}

pub fn sma_against(closes: &[f64], timeperiod: usize) -> (Vec<bool>, Vec<bool>) {
    let avg = sma_series(closes, timeperiod);
    directional_pairs(closes, &avg, true)
}

pub fn ema_with(closes: &[f64], timeperiod: usize) -> (Vec<bool>, Vec<bool>) {
    let avg = ema_series(closes, timeperiod);
    directional_pairs(closes, &avg, false)
}

pub fn ema_against(closes: &[f64], timeperiod: usize) -> (Vec<bool>, Vec<bool>) {
    let avg = ema_series(closes, timeperiod);
    directional_pairs(closes, &avg, true)
}

fn directional_pairs(closes: &[f64], avg: &[Option<f64>], reversed: bool) -> (Vec<bool>, Vec<bool>) {
    let mut long = vec![false; closes.len()];
    let mut short = vec![false; closes.len()];
    for (i, a) in avg.iter().enumerate() {
        if let Some(a) = a {
            let above = closes[i] > *a;
            let below = closes[i] < *a;
            if reversed {
                long[i] = below;
                short[i] = above;
            } else {
                long[i] = above;
                short[i] = below;
            }
        }
    }
    (long, short)
}

fn crossover_pairs(
    closes: &[f64],
    fast: &[Option<f64>],
    slow: &[Option<f64>],
    reversed: bool,
) -> (Vec<bool>, Vec<bool>) {
    let mut long = vec![false; closes.len()];
    let mut short = vec![false; closes.len()];
    for i in 0..closes.len() {
        if let (Some(f), Some(s)) = (fast[i], slow[i]) {
            let fast_above = f > s;
            let fast_below = f < s;
            if reversed {
                long[i] = fast_below;
                short[i] = fast_above;
            } else {
                long[i] = fast_above;
                short[i] = fast_below;
            }
        }
    }
    (long, short)
}

pub fn sma_crossover_with(closes: &[f64], fast_period: usize, slow_period: usize) -> (Vec<bool>, Vec<bool>) {
    let fast = sma_series(closes, fast_period);
    let slow = sma_series(closes, slow_period);
    crossover_pairs(closes, &fast, &slow, false)
}

pub fn sma_crossover_against(closes: &[f64], fast_period: usize, slow_period: usize) -> (Vec<bool>, Vec<bool>) {
    let fast = sma_series(closes, fast_period);
    let slow = sma_series(closes, slow_period);
    crossover_pairs(closes, &fast, &slow, true)
}

pub fn ema_crossover_with(closes: &[f64], fast_period: usize, slow_period: usize) -> (Vec<bool>, Vec<bool>) {
    let fast = ema_series(closes, fast_period);
    let slow = ema_series(closes, slow_period);
    crossover_pairs(closes, &fast, &slow, false)
}

pub fn ema_crossover_against(closes: &[f64], fast_period: usize, slow_period: usize) -> (Vec<bool>, Vec<bool>) {
    let fast = ema_series(closes, fast_period);
    let slow = ema_series(closes, slow_period);
    crossover_pairs(closes, &fast, &slow, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_with_goes_long_above_average() {
        let closes = vec![1.0, 1.0, 1.0, 10.0];
        let (long, short) = sma_with(&closes, 3);
        assert_eq!(long[3], true);
        assert_eq!(short[3], false);
    }

    #[test]
    fn sma_against_inverts_sma_with() {
        let closes = vec![1.0, 1.0, 1.0, 10.0];
        let (long_with, short_with) = sma_with(&closes, 3);
        let (long_against, short_against) = sma_against(&closes, 3);
        assert_eq!(long_with[3], short_against[3]);
        assert_eq!(short_with[3], long_against[3]);
    }

    #[test]
    fn insufficient_history_yields_no_signal() {
        let closes = vec![1.0, 2.0];
        let (long, short) = sma_with(&closes, 5);
        assert!(long.iter().all(|&v| !v));
        assert!(short.iter().all(|&v| !v));
    }

    #[test]
    fn crossover_with_goes_long_when_fast_above_slow() {
        let closes: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let (long, short) = sma_crossover_with(&closes, 2, 4);
        assert_eq!(long[9], true);
        assert_eq!(short[9], false);
    }
}
