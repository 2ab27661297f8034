//! Trade Simulator (C6): given an entry minute and direction, scans forward for the first exit
//! condition and fills it, applying slippage. Ported from the original's `calculate_trade`,
//! including its exact tie-break order when more than one exit condition is satisfiable on the
//! same minute: Stoploss > ProfitTarget > TimedExit > MaxLength > NextEntry.

use crate::constants::MINUTES_PER_DAY;
use crate::model::bar::Bar;
use crate::model::trade::{Direction, ExitReason, Trade};

/// Slippage-adjusted fill: a worse price than the raw bar price, in the direction that hurts the
/// position being opened or closed.
fn slipped_price(raw: f64, slippage: f64, buying: bool) -> f64 {
    if buying {
        raw * (1.0 + slippage)
    } else {
        raw * (1.0 - slippage)
    }
}

#[derive(Clone, Copy)]
pub struct SimulationInputs<'a> {
    pub bars: &'a [Bar],
    pub entry_minute_index: usize,
    pub direction: Direction,
    pub stoploss: f64,
    pub profit_target: f64,
    pub max_trade_length: Option<usize>,
    /// Calendar-forced exit minutes (end of day, session end, holiday, risk event, circuit
    /// breaker), already OR-reduced by the caller.
    pub timed_exits: &'a [bool],
    /// Minute index of the next entry decision after this one, if any (the `NextEntry` exit
    /// reason fires here so a position is never open across two overlapping entries).
    pub next_entry_index: Option<usize>,
    pub slippage: f64,
}

pub fn simulate_trade(period_index: usize, inputs: &SimulationInputs) -> Trade {
    let SimulationInputs {
        bars,
        entry_minute_index,
        direction,
        stoploss,
        profit_target,
        max_trade_length,
        timed_exits,
        next_entry_index,
        slippage,
    } = *inputs;

    let last_index = bars.len() - 1;
    let entry_bar = &bars[entry_minute_index];
    let buying_to_enter = direction == Direction::Long;
    let entry_price_raw = entry_bar.open;
    let entry_price = slipped_price(entry_price_raw, slippage, buying_to_enter);

    let (stop_loss_price, profit_target_price) = match direction {
        Direction::Long => (
            entry_price * (1.0 - stoploss),
            entry_price * (1.0 + profit_target),
        ),
        Direction::Short => (
            entry_price * (1.0 + stoploss),
            entry_price * (1.0 - profit_target),
        ),
    };

    // `entry_minute_index` is already the fill minute (`m+1` in spec terms); the stop/target scan
    // runs from the fill minute itself through the window end, while the timed-exit scan also
    // covers the decision minute (`entry_minute_index - 1`) the fill follows.
    let scan_start = entry_minute_index;
    let timed_scan_start = entry_minute_index - 1;
    // The window a trade can run within: `max_trade_length` if the strategy sets one, otherwise
    // capped to one trading day so an unbounded scan never runs off a thinly-traded period.
    let window_end =
        (entry_minute_index - 1 + max_trade_length.unwrap_or(MINUTES_PER_DAY)).min(last_index);

    let stop_loss_exit = (scan_start..=window_end).find(|&i| match direction {
        Direction::Long => bars[i].low <= stop_loss_price,
        Direction::Short => bars[i].high >= stop_loss_price,
    });

    let profit_target_exit = (scan_start..=window_end).find(|&i| match direction {
        Direction::Long => bars[i].high >= profit_target_price,
        Direction::Short => bars[i].low <= profit_target_price,
    });

    let timed_exit =
        (timed_scan_start..=window_end).find(|&i| timed_exits.get(i).copied().unwrap_or(false));

    let max_exit_index = max_trade_length.map(|_| window_end);

    let subsequent_entry_index = next_entry_index.filter(|&i| i > entry_minute_index && i <= window_end);

    // Stoploss > ProfitTarget > TimedExit > MaxLength > NextEntry, ties broken by this order when
    // two conditions land on the same minute.
    let candidates: [(Option<usize>, ExitReason); 5] = [
        (stop_loss_exit, ExitReason::Stoploss),
        (profit_target_exit, ExitReason::ProfitTarget),
        (timed_exit, ExitReason::TimedExit),
        (max_exit_index, ExitReason::MaxLength),
        (subsequent_entry_index, ExitReason::NextEntry),
    ];

    let (exit_index, exit_reason) = candidates
        .iter()
        .filter_map(|&(idx, reason)| idx.map(|i| (i, reason)))
        .min_by_key(|&(i, reason)| (i, priority_rank(reason)))
        .unwrap_or((window_end, ExitReason::Unknown));

    let exit_bar = &bars[exit_index];
    let exit_price_raw = match exit_reason {
        ExitReason::Stoploss => stop_loss_price,
        ExitReason::ProfitTarget => profit_target_price,
        _ => exit_bar.close,
    };
    let exit_price = slipped_price(exit_price_raw, slippage, !buying_to_enter);

    Trade {
        period_index,
        direction,
        entry_minute_index,
        exit_minute_index: exit_index,
        entry_datetime: entry_bar.datetime,
        exit_datetime: exit_bar.datetime,
        entry_price_raw,
        exit_price_raw,
        entry_price,
        exit_price,
        stop_loss_price,
        profit_target_price,
        exit_reason,
    }
}

/// Spreads a trade's realized return across the minutes it was held, writing into the caller's
/// flat per-minute return buffer at `period_offset + i`. The naive per-bar delta
/// `(close[i] - close[i-1])` is corrected at the fill minute (actual fill was `entry_price`, not
/// `close[entry_minute_index]`) and at the exit minute (actual fill was `exit_price`, not
/// `close[exit_minute_index]`), so the sum of what's written always equals `trade.trade_return()`.
pub fn attribute_minute_returns(trade: &Trade, bars: &[Bar], period_offset: usize, returns: &mut [f64]) {
    let dir = match trade.direction {
        Direction::Long => 1.0,
        Direction::Short => -1.0,
    };
    let fill = trade.entry_minute_index;
    let x = trade.exit_minute_index;

    for i in fill..=x {
        let delta = (bars[i].close - bars[i - 1].close) * dir / trade.entry_price;
        returns[period_offset + i] += delta;
    }

    returns[period_offset + fill] +=
        -(trade.entry_price - bars[fill - 1].close) * dir / trade.entry_price;
    returns[period_offset + x] += -(bars[x].close - trade.exit_price) * dir / trade.entry_price;
}

fn priority_rank(reason: ExitReason) -> u8 {
    match reason {
        ExitReason::Stoploss => 0,
        ExitReason::ProfitTarget => 1,
        ExitReason::TimedExit => 2,
        ExitReason::MaxLength => 3,
        ExitReason::NextEntry => 4,
        ExitReason::Unknown => 5,
    }
}
