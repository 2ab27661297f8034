//! Numeric and enum constants describing the trading calendar, shared by the calendar builder,
//! the entry builder, and the trade simulator. Values are load-bearing: they mirror the exact
//! session/exit boundaries historically used to partition futures minute bars.

use chrono::NaiveDateTime;

/// Minutes in one trading day (23h * 60).
pub const MINUTES_PER_DAY: usize = 1380;
/// Minutes in one trading week (23h * 60 * 5).
pub const MINUTES_PER_WEEK: usize = 6900;

/// Padding sentinel for minutes beyond a period's real bar count.
pub fn default_datetime() -> NaiveDateTime {
    chrono::NaiveDate::from_ymd_opt(2006, 12, 31)
        .expect("valid calendar date")
        .and_hms_opt(12, 0, 0)
        .expect("valid time")
}

/// Sentinel volume marking a forward-filled (gap-carried) bar.
pub const DEFAULT_VOLUME: f64 = 0.000_001;

pub const WEEKS_PER_YEAR: f64 = 52.0;
pub const TRADING_DAY_COUNT: usize = 5;

pub const START_DAY_TRADING_HOUR: u32 = 17;
pub const DAILY_START_TRADING_HOURS: u32 = 18;

pub const DAILY_EXIT_HOURS_START: u32 = 16;
pub const DAILY_EXIT_HOURS_END: u32 = 17;

pub const DAILY_EXIT_HOURS_ASIA_FINAL_HOUR: u32 = 1;
pub const DAILY_EXIT_HOURS_LONDON_FINAL_HOUR: u32 = 8;
pub const DAILY_EXIT_HOURS_US_FINAL_HOUR: u32 = 15;
pub const DAILY_EXIT_MINUTES_END_SESSION: u32 = 55;

pub const DAILY_ENTRY_HOURS_ASIA_START: u32 = 18;
pub const DAILY_ENTRY_HOURS_ASIA_END: u32 = 2;
pub const DAILY_ENTRY_HOURS_LONDON_START: u32 = 2;
pub const DAILY_ENTRY_HOURS_LONDON_END: u32 = 9;
pub const DAILY_ENTRY_HOURS_US_START: u32 = 9;
pub const DAILY_ENTRY_HOURS_US_END: u32 = 16;
pub const DAILY_ENTRY_MINUTES_START_SESSION: u32 = 5;

/// Default cap on realized trades in one evaluation before it is marked a failed strategy.
pub const DEFAULT_LIMIT_TRADE_COUNT: usize = 1500;

/// Calendar-day gate below which an annualized Sharpe-like ratio is suppressed to 0.0 rather
/// than reported from too little history to be meaningful.
pub const MIN_CALENDAR_DAYS_FOR_ANNUALIZED: i64 = 30;

/// The lookback windows (in weeks) over which the scorer reports a full scorecard. `0` means
/// all-time.
pub const SCORE_WINDOWS_WEEKS: [u32; 10] = [0, 520, 208, 156, 104, 52, 26, 13, 8, 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// `DayOfWeek` for a minute at hour `h` of a chrono weekday `weekday`, per the trading
    /// calendar's rollover at hour 17: minutes after 17:00 belong to the next calendar day's
    /// trading session.
    pub fn from_hour_and_weekday(hour: u32, weekday: chrono::Weekday) -> Self {
        let base = Self::from_chrono(weekday);
        if hour > START_DAY_TRADING_HOUR {
            base.next()
        } else {
            base
        }
    }

    fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => DayOfWeek::Monday,
            chrono::Weekday::Tue => DayOfWeek::Tuesday,
            chrono::Weekday::Wed => DayOfWeek::Wednesday,
            chrono::Weekday::Thu => DayOfWeek::Thursday,
            chrono::Weekday::Fri => DayOfWeek::Friday,
            chrono::Weekday::Sat => DayOfWeek::Saturday,
            chrono::Weekday::Sun => DayOfWeek::Sunday,
        }
    }

    fn next(self) -> Self {
        match self {
            DayOfWeek::Monday => DayOfWeek::Tuesday,
            DayOfWeek::Tuesday => DayOfWeek::Wednesday,
            DayOfWeek::Wednesday => DayOfWeek::Thursday,
            DayOfWeek::Thursday => DayOfWeek::Friday,
            DayOfWeek::Friday => DayOfWeek::Saturday,
            DayOfWeek::Saturday => DayOfWeek::Sunday,
            DayOfWeek::Sunday => DayOfWeek::Monday,
        }
    }
}
