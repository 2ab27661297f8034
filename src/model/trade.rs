//! Trade record (C6 output). `ExitReason` mirrors the priority order Stoploss > ProfitTarget >
//! TimedExit > MaxLength > NextEntry used to break ties when more than one exit condition fires
//! on the same minute.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Unknown,
    Stoploss,
    ProfitTarget,
    TimedExit,
    MaxLength,
    NextEntry,
}

/// One simulated trade. `entry_price`/`exit_price` are slippage-adjusted fills; `*_raw` are the
/// underlying bar prices used to compute `entry_price`/`exit_price`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub period_index: usize,
    pub direction: Direction,
    pub entry_minute_index: usize,
    pub exit_minute_index: usize,
    pub entry_datetime: NaiveDateTime,
    pub exit_datetime: NaiveDateTime,
    pub entry_price_raw: f64,
    pub exit_price_raw: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss_price: f64,
    pub profit_target_price: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Signed return on this trade, long-or-short aware.
    pub fn trade_return(&self) -> f64 {
        match self.direction {
            Direction::Long => (self.exit_price - self.entry_price) / self.entry_price,
            Direction::Short => (self.entry_price - self.exit_price) / self.entry_price,
        }
    }

    pub fn is_win(&self) -> bool {
        self.trade_return() > 0.0
    }

    pub fn holding_minutes(&self) -> usize {
        self.exit_minute_index.saturating_sub(self.entry_minute_index)
    }
}
