//! ATR-breakout signal. "With" trades in the direction of a move that exceeds `multiplier` times
//! the average true range; "Against" fades it.

use rust_ti::standard_indicators::bulk::average_true_range;

pub fn max_lookback_atr_breakout(timeperiod: usize) -> usize {
    timeperiod + 1
}

fn atr_series(highs: &[f64], lows: &[f64], closes: &[f64], timeperiod: usize) -> Vec<Option<f64>> {
    if closes.len() <= timeperiod {
        return vec![None; closes.len()];
    }
    let values = average_true_range(highs, lows, closes, timeperiod);
    let lookback = closes.len() - values.len();
    let mut out = vec![None; lookback];
    out.extend(values.into_iter().map(Some));
    out
}

pub fn atr_breakout_with(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    timeperiod: usize,
    multiplier: f64,
) -> (Vec<bool>, Vec<bool>) {
    pairs(highs, lows, closes, timeperiod, multiplier, false)
}

pub fn atr_breakout_against(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    timeperiod: usize,
    multiplier: f64,
) -> (Vec<bool>, Vec<bool>) {
    pairs(highs, lows, closes, timeperiod, multiplier, true)
}

fn pairs(
    highs: &[f64],
    lows: &[f64],
    closes: &[f64],
    timeperiod: usize,
    multiplier: f64,
    reversed: bool,
) -> (Vec<bool>, Vec<bool>) {
    let atr = atr_series(highs, lows, closes, timeperiod);
    let mut long = vec![false; closes.len()];
    let mut short = vec![false; closes.len()];
    for i in 1..closes.len() {
        if let Some(band) = atr[i] {
            let delta = closes[i] - closes[i - 1];
            let breaks_up = delta > multiplier * band;
            let breaks_down = delta < -multiplier * band;
            if reversed {
                long[i] = breaks_down;
                short[i] = breaks_up;
            } else {
                long[i] = breaks_up;
                short[i] = breaks_down;
            }
        }
    }
    (long, short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakout_up_goes_long_with_not_against() {
        let highs = vec![101.0; 20];
        let lows = vec![99.0; 20];
        let mut closes = vec![100.0; 20];
        closes[19] = 200.0;
        let (long_with, short_with) = atr_breakout_with(&highs, &lows, &closes, 14, 1.0);
        let (long_against, short_against) = atr_breakout_against(&highs, &lows, &closes, 14, 1.0);
        assert_eq!(long_with[19], short_against[19]);
        assert_eq!(short_with[19], long_against[19]);
        assert!(long_with[19]);
    }

    #[test]
    fn short_history_yields_no_signal() {
        let highs = vec![1.0, 2.0];
        let lows = vec![1.0, 2.0];
        let closes = vec![1.0, 2.0];
        let (long, short) = atr_breakout_with(&highs, &lows, &closes, 14, 1.0);
        assert!(long.iter().all(|&v| !v));
        assert!(short.iter().all(|&v| !v));
    }
}
