//! Trading Calendar (C2): session/day/holiday masks over a period's minute index, ported from the
//! original session-boundary arithmetic (`trade_timing.py`). All masks are plain `Vec<bool>`
//! indexed by minute-within-period, matching `BarMatrix`'s per-period layout.

use chrono::{Datelike, NaiveDateTime, Timelike};
use rustc_hash::FxHashSet;

use crate::constants::{
    DAILY_ENTRY_HOURS_ASIA_END, DAILY_ENTRY_HOURS_ASIA_START, DAILY_ENTRY_HOURS_LONDON_END,
    DAILY_ENTRY_HOURS_LONDON_START, DAILY_ENTRY_HOURS_US_END, DAILY_ENTRY_HOURS_US_START,
    DAILY_ENTRY_MINUTES_START_SESSION, DAILY_EXIT_HOURS_ASIA_FINAL_HOUR, DAILY_EXIT_HOURS_END,
    DAILY_EXIT_HOURS_LONDON_FINAL_HOUR, DAILY_EXIT_HOURS_START, DAILY_EXIT_HOURS_US_FINAL_HOUR,
    DAILY_EXIT_MINUTES_END_SESSION, START_DAY_TRADING_HOUR,
};
use crate::model::strategy::Session;

/// `true` where `hour` falls in the `[start, end)` range, wrapping past midnight when
/// `start > end` (used by sessions that span the day boundary, e.g. Asia 18:00-02:00).
fn hour_in_range(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

fn session_hours(session: Session) -> (u32, u32) {
    match session {
        Session::Asia => (DAILY_ENTRY_HOURS_ASIA_START, DAILY_ENTRY_HOURS_ASIA_END),
        Session::London => (DAILY_ENTRY_HOURS_LONDON_START, DAILY_ENTRY_HOURS_LONDON_END),
        Session::Us => (DAILY_ENTRY_HOURS_US_START, DAILY_ENTRY_HOURS_US_END),
        Session::All => (0, 0),
    }
}

fn final_exit_hour(session: Session) -> Option<u32> {
    match session {
        Session::Asia => Some(DAILY_EXIT_HOURS_ASIA_FINAL_HOUR),
        Session::London => Some(DAILY_EXIT_HOURS_LONDON_FINAL_HOUR),
        // All's own window also ends at hour DAILY_ENTRY_HOURS_US_END, so it shares the US
        // session's final closing hour.
        Session::Us | Session::All => Some(DAILY_EXIT_HOURS_US_FINAL_HOUR),
    }
}

/// Entries permitted in this session: inside the session's hour range, excluding the opening
/// `DAILY_ENTRY_MINUTES_START_SESSION` minutes (sessions open a few minutes "cold" while the
/// first bars settle) and the fixed daily exit window `[DAILY_EXIT_HOURS_START,
/// DAILY_EXIT_HOURS_END)` that closes the whole trading day regardless of session.
pub fn create_session_entries(datetimes: &[NaiveDateTime], session: Session) -> Vec<bool> {
    datetimes
        .iter()
        .map(|dt| {
            let hour = dt.hour();
            let minute = dt.minute();

            // All spans 18:00-16:00, so it excludes the whole [16:00, 18:00) gap, not merely
            // the fixed end-of-day window other sessions share. It still shares the US session's
            // closing-minute exclusion and the Asia session's opening-minute exclusion, since its
            // window opens where Asia's does and closes where US's does.
            if matches!(session, Session::All) {
                if !hour_in_range(hour, DAILY_EXIT_HOURS_START, DAILY_ENTRY_HOURS_ASIA_START) {
                    return false;
                }
                if hour == DAILY_EXIT_HOURS_US_FINAL_HOUR && minute >= DAILY_EXIT_MINUTES_END_SESSION {
                    return false;
                }
                if hour == DAILY_ENTRY_HOURS_ASIA_START && minute < DAILY_ENTRY_MINUTES_START_SESSION {
                    return false;
                }
                return true;
            }

            if hour_in_range(hour, DAILY_EXIT_HOURS_START, DAILY_EXIT_HOURS_END) {
                return false;
            }

            let (start, end) = session_hours(session);
            if !hour_in_range(hour, start, end) {
                return false;
            }

            if hour == start && minute < DAILY_ENTRY_MINUTES_START_SESSION {
                return false;
            }

            true
        })
        .collect()
}

/// Entries permitted on the allowed weekdays, computed from the calendar's 17:00 day rollover
/// (minutes after 17:00 belong to the next trading day, per `DayOfWeek::from_hour_and_weekday`).
pub fn create_allowed_days(datetimes: &[NaiveDateTime], allowed_weekday_indexes: &[usize]) -> Vec<bool> {
    datetimes
        .iter()
        .map(|dt| {
            let trading_day = crate::constants::DayOfWeek::from_hour_and_weekday(
                dt.hour(),
                dt.date().weekday(),
            );
            let index = match trading_day {
                crate::constants::DayOfWeek::Monday => Some(0),
                crate::constants::DayOfWeek::Tuesday => Some(1),
                crate::constants::DayOfWeek::Wednesday => Some(2),
                crate::constants::DayOfWeek::Thursday => Some(3),
                crate::constants::DayOfWeek::Friday => Some(4),
                _ => None,
            };
            index.is_some_and(|i| allowed_weekday_indexes.contains(&i))
        })
        .collect()
}

/// Exits forced at the end of the trading day: the fixed `[DAILY_EXIT_HOURS_START,
/// DAILY_EXIT_HOURS_END)` window that closes every session.
pub fn create_end_of_day_exits(datetimes: &[NaiveDateTime]) -> Vec<bool> {
    datetimes
        .iter()
        .map(|dt| hour_in_range(dt.hour(), DAILY_EXIT_HOURS_START, DAILY_EXIT_HOURS_END))
        .collect()
}

/// Exits forced in the closing `DAILY_EXIT_MINUTES_END_SESSION..60` minutes of a session's final
/// hour, so a position is never left open as the session itself is closing.
pub fn create_session_end_exits(datetimes: &[NaiveDateTime], session: Session) -> Vec<bool> {
    let Some(final_hour) = final_exit_hour(session) else {
        return vec![false; datetimes.len()];
    };
    datetimes
        .iter()
        .map(|dt| dt.hour() == final_hour && dt.minute() >= DAILY_EXIT_MINUTES_END_SESSION)
        .collect()
}

/// Exits forced by a fixed set of risk-event minutes (e.g. scheduled economic releases), supplied
/// by the caller as exact timestamps to avoid. A period rarely has more than a handful of risk
/// events, but a strategy's bar matrix can span thousands of periods sharing the same event
/// calendar, so the membership set is built once per call rather than re-scanned per minute.
pub fn create_risk_events_exits(datetimes: &[NaiveDateTime], risk_events: &[NaiveDateTime]) -> Vec<bool> {
    let set: FxHashSet<NaiveDateTime> = risk_events.iter().copied().collect();
    datetimes.iter().map(|dt| set.contains(dt)).collect()
}

/// Exits forced on holiday calendar dates, supplied by the caller.
pub fn create_holidays_exits(datetimes: &[NaiveDateTime], holidays: &[chrono::NaiveDate]) -> Vec<bool> {
    let set: FxHashSet<chrono::NaiveDate> = holidays.iter().copied().collect();
    datetimes.iter().map(|dt| set.contains(&dt.date())).collect()
}

/// Exits forced during a circuit breaker window, supplied by the caller as `(start, end)` pairs
/// (inclusive-exclusive) over the raw timestamp.
pub fn create_circuit_breaker_exits(
    datetimes: &[NaiveDateTime],
    windows: &[(NaiveDateTime, NaiveDateTime)],
) -> Vec<bool> {
    datetimes
        .iter()
        .map(|dt| windows.iter().any(|(start, end)| dt >= start && dt < end))
        .collect()
}

/// Entries disallowed when a forced exit falls anywhere inside the window the trade would run in:
/// minute `m` is blanked if any `timed_exits[m ..= min(m+max_trade_length, last)]` is true,
/// including `m` itself, so a `max_trade_length` strategy never opens a position it cannot hold
/// for its full length before some calendar-forced exit (end of day, session end, holiday, risk
/// event, circuit breaker) cuts it short. Ported from the original's `create_before_timed_entries`,
/// which walks backward from each true exit index and blanks `[idx-window, idx]` inclusive — the
/// same window, read forward from `m`. This is a window check against the *actual* timed-exit
/// positions, not merely the tail of the period — a daily reset's end-of-day exit recurs every
/// ~1380 minutes inside a period, not only at its very end.
pub fn create_before_timed_entries(
    allowed_entries: &[bool],
    timed_exits: &[bool],
    max_trade_length: usize,
) -> Vec<bool> {
    let n = allowed_entries.len();
    let mut out = allowed_entries.to_vec();
    if max_trade_length == 0 || n == 0 {
        return out;
    }
    for m in 0..n {
        if !out[m] {
            continue;
        }
        let window_end = (m + max_trade_length).min(n - 1);
        if (m..=window_end).any(|i| timed_exits.get(i).copied().unwrap_or(false)) {
            out[m] = false;
        }
    }
    out
}

/// OR-reduce any number of exit masks into one.
pub fn union_exits(masks: &[Vec<bool>]) -> Vec<bool> {
    let len = masks.first().map_or(0, Vec::len);
    let mut out = vec![false; len];
    for mask in masks {
        for (o, &m) in out.iter_mut().zip(mask.iter()) {
            *o |= m;
        }
    }
    out
}

/// AND-reduce two entry masks (e.g. session entries AND allowed days).
pub fn intersect(a: &[bool], b: &[bool]) -> Vec<bool> {
    a.iter().zip(b.iter()).map(|(&x, &y)| x && y).collect()
}

/// The Sunday-17:00 week start used to bucket trades for `one_trade_per_week`: a calendar week
/// begins at the same 17:00 rollover hour used for daily sessions, on the preceding Sunday.
pub fn get_start_of_week(dt: NaiveDateTime) -> NaiveDateTime {
    let mut date = dt.date();
    while date.weekday() != chrono::Weekday::Sun {
        date = date.pred_opt().expect("valid date");
    }
    date.and_hms_opt(START_DAY_TRADING_HOUR, 0, 0)
        .expect("valid time")
}
