//! Bar Store external boundary (C1's storage side): a `BarStore` trait plus a SQLite-backed and
//! an in-memory implementation, mirroring the host crate's `DataStore` trait /
//! `ParquetStore`+`PostgresStore` pair in `data::mod`.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};

use crate::model::bar::Bar;

/// Read-side of the bar/calendar data the backtest core needs. Implementations own their own
/// connection/storage details; callers only see plain domain types.
pub trait BarStore: Send + Sync {
    /// Minute bars for `market` in `[start, end]`, chronologically sorted, already grouped into
    /// `Vec<Bar>` periods at the caller's chosen reset boundary (daily or weekly).
    fn load_bar_groups(&self, market: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Vec<Bar>>>;

    fn list_markets(&self) -> Result<Vec<String>>;

    fn holidays(&self, market: &str) -> Result<Vec<NaiveDate>>;

    fn risk_events(&self, market: &str) -> Result<Vec<NaiveDateTime>>;

    fn circuit_breaker_windows(&self, market: &str) -> Result<Vec<(NaiveDateTime, NaiveDateTime)>>;
}
