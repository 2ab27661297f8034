//! RSI-based mean-reversion signal. "With" trades in the direction the extreme implies a bounce
//! (oversold → long, overbought → short); "Against" fades that bounce.

use rust_ti::standard_indicators::bulk::relative_strength_index;

pub fn max_lookback_rsi(timeperiod: usize) -> usize {
    timeperiod
}

fn rsi_series(closes: &[f64], timeperiod: usize) -> Vec<Option<f64>> {
    if closes.len() <= timeperiod {
        return vec![None; closes.len()];
    }
    let values = relative_strength_index(closes, timeperiod);
    let lookback = closes.len() - values.len();
    let mut out = vec![None; lookback];
    out.extend(values.into_iter().map(Some));
    out
}

pub fn rsi_with(closes: &[f64], timeperiod: usize, oversold: f64, overbought: f64) -> (Vec<bool>, Vec<bool>) {
    pairs(closes, timeperiod, oversold, overbought, false)
}

pub fn rsi_against(closes: &[f64], timeperiod: usize, oversold: f64, overbought: f64) -> (Vec<bool>, Vec<bool>) {
    pairs(closes, timeperiod, oversold, overbought, true)
}

fn pairs(
    closes: &[f64],
    timeperiod: usize,
    oversold: f64,
    overbought: f64,
    reversed: bool,
) -> (Vec<bool>, Vec<bool>) {
    let rsi = rsi_series(closes, timeperiod);
    let mut long = vec![false; closes.len()];
    let mut short = vec![false; closes.len()];
    for (i, r) in rsi.iter().enumerate() {
        if let Some(r) = r {
            let is_oversold = *r < oversold;
            let is_overbought = *r > overbought;
            if reversed {
                long[i] = is_overbought;
                short[i] = is_oversold;
            } else {
                long[i] = is_oversold;
                short[i] = is_overbought;
            }
        }
    }
    (long, short)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversold_goes_long_with_not_against() {
        let mut closes = vec![100.0; 20];
        for (i, c) in closes.iter_mut().enumerate() {
            *c = 100.0 - i as f64;
        }
        let (long_with, short_with) = rsi_with(&closes, 14, 30.0, 70.0);
        let (long_against, short_against) = rsi_against(&closes, 14, 30.0, 70.0);
        let last = closes.len() - 1;
        assert_eq!(long_with[last], short_against[last]);
        assert_eq!(short_with[last], long_against[last]);
    }

    #[test]
    fn short_history_yields_no_signal() {
        let closes = vec![1.0, 2.0, 3.0];
        let (long, short) = rsi_with(&closes, 14, 30.0, 70.0);
        assert!(long.iter().all(|&v| !v));
        assert!(short.iter().all(|&v| !v));
    }
}
