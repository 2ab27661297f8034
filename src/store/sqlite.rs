//! SQLite-backed `BarStore`. `rusqlite::Connection` isn't `Sync`, so it's held behind a `Mutex`
//! the way the host crate's async stores hold a connection pool — one critical section per query,
//! which is fine here since the store is only touched once per evaluation to hydrate the bar
//! matrix, never on the per-period hot path. Schema is applied via `refinery` migrations
//! (`migrations/V1__bar_store.sql`) rather than an inline `CREATE TABLE` string.

use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use super::BarStore;
use crate::model::bar::Bar;

refinery::embed_migrations!("migrations");

pub struct SqliteBarStore {
    conn: Mutex<Connection>,
}

impl SqliteBarStore {
    pub fn open(path: &str) -> Result<Self> {
        let mut conn = Connection::open(path).with_context(|| format!("opening bar store at {path}"))?;
        migrations::runner()
            .run(&mut conn)
            .context("applying bar store migrations")?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().context("opening in-memory bar store")?;
        migrations::runner()
            .run(&mut conn)
            .context("applying bar store migrations")?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

const DATETIME_FMT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FMT: &str = "%Y-%m-%d";

impl BarStore for SqliteBarStore {
    fn load_bar_groups(&self, market: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Vec<Bar>>> {
        let conn = self.conn.lock().expect("bar store connection poisoned");
        let mut stmt = conn.prepare(
            "SELECT datetime, open, high, low, close, volume FROM bars \
             WHERE market = ?1 AND date(datetime) BETWEEN date(?2) AND date(?3) \
             ORDER BY datetime ASC",
        )?;
        let rows = stmt.query_map(
            rusqlite::params![market, start.format(DATE_FMT).to_string(), end.format(DATE_FMT).to_string()],
            |row| {
                let datetime: String = row.get(0)?;
                Ok(Bar {
                    datetime: NaiveDateTime::parse_from_str(&datetime, DATETIME_FMT)
                        .unwrap_or_else(|_| crate::constants::default_datetime()),
                    open: row.get(1)?,
                    high: row.get(2)?,
                    low: row.get(3)?,
                    close: row.get(4)?,
                    volume: row.get(5)?,
                })
            },
        )?;

        let mut bars = Vec::new();
        for row in rows {
            bars.push(row?);
        }

        if bars.is_empty() {
            anyhow::bail!("no bars available for market '{market}' in range {start}..{end}");
        }

        // The caller decides the reset boundary (daily/weekly); a flat SQLite table has no notion
        // of "period", so split on calendar-day boundaries here and let callers that need weekly
        // periods re-merge groups (`BarMatrix::build` only cares about chronological order within
        // a group, not how many calendar days it spans).
        let mut groups: Vec<Vec<Bar>> = Vec::new();
        for bar in bars {
            match groups.last_mut() {
                Some(group) if group.last().is_some_and(|b| b.datetime.date() == bar.datetime.date()) => {
                    group.push(bar);
                }
                _ => groups.push(vec![bar]),
            }
        }
        Ok(groups)
    }

    fn list_markets(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().expect("bar store connection poisoned");
        let mut stmt = conn.prepare("SELECT DISTINCT market FROM bars ORDER BY market")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut markets = Vec::new();
        for row in rows {
            markets.push(row?);
        }
        Ok(markets)
    }

    fn holidays(&self, market: &str) -> Result<Vec<NaiveDate>> {
        let conn = self.conn.lock().expect("bar store connection poisoned");
        let mut stmt = conn.prepare("SELECT date FROM holidays WHERE market = ?1 ORDER BY date")?;
        let rows = stmt.query_map(rusqlite::params![market], |row| {
            let date: String = row.get(0)?;
            Ok(date)
        })?;
        let mut holidays = Vec::new();
        for row in rows {
            if let Ok(date) = NaiveDate::parse_from_str(&row?, DATE_FMT) {
                holidays.push(date);
            }
        }
        Ok(holidays)
    }

    fn risk_events(&self, market: &str) -> Result<Vec<NaiveDateTime>> {
        let conn = self.conn.lock().expect("bar store connection poisoned");
        let mut stmt = conn.prepare("SELECT datetime FROM risk_events WHERE market = ?1 ORDER BY datetime")?;
        let rows = stmt.query_map(rusqlite::params![market], |row| {
            let dt: String = row.get(0)?;
            Ok(dt)
        })?;
        let mut events = Vec::new();
        for row in rows {
            if let Ok(dt) = NaiveDateTime::parse_from_str(&row?, DATETIME_FMT) {
                events.push(dt);
            }
        }
        Ok(events)
    }

    fn circuit_breaker_windows(&self, market: &str) -> Result<Vec<(NaiveDateTime, NaiveDateTime)>> {
        let conn = self.conn.lock().expect("bar store connection poisoned");
        let mut stmt =
            conn.prepare("SELECT starts_at, ends_at FROM circuit_breaker_windows WHERE market = ?1")?;
        let rows = stmt.query_map(rusqlite::params![market], |row| {
            let start: String = row.get(0)?;
            let end: String = row.get(1)?;
            Ok((start, end))
        })?;
        let mut windows = Vec::new();
        for row in rows {
            let (start, end) = row?;
            if let (Ok(start), Ok(end)) = (
                NaiveDateTime::parse_from_str(&start, DATETIME_FMT),
                NaiveDateTime::parse_from_str(&end, DATETIME_FMT),
            ) {
                windows.push((start, end));
            }
        }
        Ok(windows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(store: &SqliteBarStore) {
        let conn = store.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO bars (market, datetime, open, high, low, close, volume) VALUES \
             ('ES', '2024-01-02 18:00:00', 100.0, 100.5, 99.5, 100.0, 1.0), \
             ('ES', '2024-01-02 18:01:00', 100.0, 100.5, 99.5, 100.2, 1.0), \
             ('ES', '2024-01-03 18:00:00', 101.0, 101.5, 100.5, 101.0, 1.0)",
            [],
        )
        .unwrap();
    }

    #[test]
    fn load_bar_groups_splits_on_calendar_day() {
        let store = SqliteBarStore::in_memory().unwrap();
        seed(&store);
        let groups = store
            .load_bar_groups(
                "ES",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            )
            .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn missing_market_errors() {
        let store = SqliteBarStore::in_memory().unwrap();
        let result = store.load_bar_groups(
            "ZZ",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        );
        assert!(result.is_err());
    }
}
