//! In-memory `BarStore`, built by tests and by callers seeding a one-off evaluation without a
//! database (mirrors the host crate's preference for a lightweight store in test fixtures).

use std::collections::HashMap;

use anyhow::{bail, Result};
use chrono::{NaiveDate, NaiveDateTime};

use super::BarStore;
use crate::model::bar::Bar;

#[derive(Debug, Clone, Default)]
pub struct MarketData {
    pub groups: Vec<Vec<Bar>>,
    pub holidays: Vec<NaiveDate>,
    pub risk_events: Vec<NaiveDateTime>,
    pub circuit_breaker_windows: Vec<(NaiveDateTime, NaiveDateTime)>,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBarStore {
    markets: HashMap<String, MarketData>,
}

impl MemoryBarStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, market: impl Into<String>, data: MarketData) {
        self.markets.insert(market.into(), data);
    }
}

impl BarStore for MemoryBarStore {
    fn load_bar_groups(&self, market: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Vec<Bar>>> {
        let Some(data) = self.markets.get(market) else {
            bail!("no bars available for market '{market}' in range {start}..{end}");
        };
        let filtered = data
            .groups
            .iter()
            .filter(|group| {
                group
                    .first()
                    .is_some_and(|b| b.datetime.date() >= start && b.datetime.date() <= end)
            })
            .cloned()
            .collect();
        Ok(filtered)
    }

    fn list_markets(&self) -> Result<Vec<String>> {
        Ok(self.markets.keys().cloned().collect())
    }

    fn holidays(&self, market: &str) -> Result<Vec<NaiveDate>> {
        Ok(self.markets.get(market).map(|d| d.holidays.clone()).unwrap_or_default())
    }

    fn risk_events(&self, market: &str) -> Result<Vec<NaiveDateTime>> {
        Ok(self.markets.get(market).map(|d| d.risk_events.clone()).unwrap_or_default())
    }

    fn circuit_breaker_windows(&self, market: &str) -> Result<Vec<(NaiveDateTime, NaiveDateTime)>> {
        Ok(self
            .markets
            .get(market)
            .map(|d| d.circuit_breaker_windows.clone())
            .unwrap_or_default())
    }
}
