//! Strategy record (§3, §9 "dynamic strategy record → tagged record"). `IndicatorSpec` is a
//! closed enum with one variant per (indicator, With/Against) pair, each carrying its own
//! fixed-layout parameter fields rather than a dynamic name→value map — the compiler checks
//! parameter names for us.

use garde::Validate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::BacktestError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Session {
    All,
    Asia,
    London,
    Us,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorReset {
    Weekly,
    Daily,
}

/// One `(indicator, With/Against)` pair and its parameters. See `src/indicators` for the
/// registry that turns a spec into a `(long, short)` boolean pair and a `max_lookback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind")]
pub enum IndicatorSpec {
    SmaWith { timeperiod: usize },
    SmaAgainst { timeperiod: usize },
    EmaWith { timeperiod: usize },
    EmaAgainst { timeperiod: usize },
    SmaCrossoverWith { fast_period: usize, slow_period: usize },
    SmaCrossoverAgainst { fast_period: usize, slow_period: usize },
    EmaCrossoverWith { fast_period: usize, slow_period: usize },
    EmaCrossoverAgainst { fast_period: usize, slow_period: usize },
    RsiWith { timeperiod: usize, oversold: f64, overbought: f64 },
    RsiAgainst { timeperiod: usize, oversold: f64, overbought: f64 },
    AtrBreakoutWith { timeperiod: usize, multiplier: f64 },
    AtrBreakoutAgainst { timeperiod: usize, multiplier: f64 },
}

impl IndicatorSpec {
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorSpec::SmaWith { .. } => "SMA_With",
            IndicatorSpec::SmaAgainst { .. } => "SMA_Against",
            IndicatorSpec::EmaWith { .. } => "EMA_With",
            IndicatorSpec::EmaAgainst { .. } => "EMA_Against",
            IndicatorSpec::SmaCrossoverWith { .. } => "SMA_Crossover_With",
            IndicatorSpec::SmaCrossoverAgainst { .. } => "SMA_Crossover_Against",
            IndicatorSpec::EmaCrossoverWith { .. } => "EMA_Crossover_With",
            IndicatorSpec::EmaCrossoverAgainst { .. } => "EMA_Crossover_Against",
            IndicatorSpec::RsiWith { .. } => "RSI_With",
            IndicatorSpec::RsiAgainst { .. } => "RSI_Against",
            IndicatorSpec::AtrBreakoutWith { .. } => "ATR_Breakout_With",
            IndicatorSpec::AtrBreakoutAgainst { .. } => "ATR_Breakout_Against",
        }
    }

    /// `"<name>,<sorted-params-json>"`, the cache key of §3/§4.4.
    pub fn fingerprint(&self) -> String {
        let value = serde_json::to_value(self).expect("IndicatorSpec always serializes");
        let mut params = match value {
            serde_json::Value::Object(map) => map,
            _ => unreachable!("IndicatorSpec serializes as an object"),
        };
        params.remove("kind");
        let sorted: BTreeMap<String, serde_json::Value> = params.into_iter().collect();
        format!(
            "{},{}",
            self.name(),
            serde_json::to_string(&sorted).expect("sorted map always serializes")
        )
    }
}

#[derive(Debug, Clone, Validate, Serialize, Deserialize, JsonSchema)]
pub struct Strategy {
    #[garde(range(min = 0.0003, max = 0.05))]
    pub stoploss: f64,
    #[garde(range(min = 0.0003, max = 0.05))]
    pub profit_target: f64,
    #[garde(skip)]
    pub session: Session,
    #[garde(skip)]
    pub max_trade_length: Option<usize>,
    #[garde(skip)]
    pub monday: bool,
    #[garde(skip)]
    pub tuesday: bool,
    #[garde(skip)]
    pub wednesday: bool,
    #[garde(skip)]
    pub thursday: bool,
    #[garde(skip)]
    pub friday: bool,
    #[garde(skip)]
    pub take_every_signal: bool,
    #[garde(skip)]
    pub one_trade_per_week: bool,
    #[garde(skip)]
    pub indicator_reset: IndicatorReset,
    #[garde(length(min = 1))]
    pub indicators: Vec<IndicatorSpec>,
}

impl Strategy {
    /// Full validation: garde's declared field bounds plus the cross-field checks that garde
    /// can't express (max_trade_length's discrete domain, and §9 open question (a)'s rejected
    /// combination).
    pub fn validate_full(&self) -> Result<(), BacktestError> {
        self.validate().map_err(|e| BacktestError::InvalidStrategy {
            reason: e.to_string(),
        })?;

        if let Some(len) = self.max_trade_length {
            if len == 0 || len % 5 != 0 || len > 300 {
                return Err(BacktestError::InvalidStrategy {
                    reason: format!("max_trade_length {len} must be a multiple of 5 in 5..=300"),
                });
            }
        }

        if self.indicator_reset == IndicatorReset::Daily && self.one_trade_per_week {
            return Err(BacktestError::InvalidStrategy {
                reason:
                    "one_trade_per_week combined with daily indicator_reset is an ambiguous \
                     configuration and is rejected rather than guessed at (see design notes)"
                        .to_string(),
            });
        }

        if !(self.monday || self.tuesday || self.wednesday || self.thursday || self.friday) {
            return Err(BacktestError::InvalidStrategy {
                reason: "strategy permits no weekday for entries".to_string(),
            });
        }

        Ok(())
    }

    /// The weekday indexes (Monday=0..Friday=4) this strategy permits entries on.
    pub fn allowed_weekday_indexes(&self) -> Vec<usize> {
        [
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
        ]
        .iter()
        .enumerate()
        .filter_map(|(i, &allowed)| allowed.then_some(i))
        .collect()
    }
}
