//! Bar Store data model (C1): a three-axis bar matrix indexed by (field, period, minute), plus
//! the offset/length bookkeeping used to flatten and re-expand it.

use chrono::NaiveDateTime;

use crate::constants::{default_datetime, DayOfWeek, MINUTES_PER_DAY, MINUTES_PER_WEEK};
use crate::model::strategy::IndicatorReset;

/// A single minute bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub datetime: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// A padding bar: sentinel timestamp, zero OHLC. Must never be entered as a trade (spec
    /// invariant ii).
    fn padding() -> Self {
        Self {
            datetime: default_datetime(),
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0.0,
        }
    }
}

/// One trading period's bars, padded out to the reset type's capacity (`MINUTES_PER_DAY` or
/// `MINUTES_PER_WEEK`). `length` is the number of real (non-padding) bars.
#[derive(Debug, Clone)]
pub struct Period {
    pub bars: Vec<Bar>,
    pub length: usize,
    pub day_of_week: Option<DayOfWeek>,
}

/// Bar matrix for one (market, date range, reset type): a chronological sequence of periods,
/// each padded to a fixed capacity, plus the flat (real-bars-only) view used for addressing the
/// global return series.
#[derive(Debug, Clone)]
pub struct BarMatrix {
    pub periods: Vec<Period>,
    /// Cumulative count of *real* minutes preceding period `p` in the flattened series.
    pub period_offsets: Vec<usize>,
    /// Number of real bars in period `p` (mirrors `periods[p].length`, kept alongside for
    /// callers that only need the lengths).
    pub period_lengths: Vec<usize>,
    /// Flat, real-bars-only datetimes; `all_datetimes.len() == sum(period_lengths)`.
    pub all_datetimes: Vec<NaiveDateTime>,
    pub capacity: usize,
}

impl BarMatrix {
    /// Build a bar matrix from chronologically-sorted, already period-partitioned bar groups.
    /// Each input group becomes one `Period`, padded to `reset`'s capacity.
    pub fn build(groups: Vec<Vec<Bar>>, reset: IndicatorReset) -> Self {
        let capacity = match reset {
            IndicatorReset::Daily => MINUTES_PER_DAY,
            IndicatorReset::Weekly => MINUTES_PER_WEEK,
        };

        let mut periods = Vec::with_capacity(groups.len());
        let mut period_offsets = Vec::with_capacity(groups.len());
        let mut period_lengths = Vec::with_capacity(groups.len());
        let mut all_datetimes = Vec::new();
        let mut running_offset = 0usize;

        for mut group in groups {
            // A group can exceed `capacity` if the caller's period split doesn't line up with the
            // reset boundary (e.g. a calendar-midnight split against a 17:00 trading-day rollover);
            // clamp `length` to what `resize` actually keeps so it never outruns `group.bars`.
            let length = group.len().min(capacity);
            if group.len() > capacity {
                tracing::warn!(
                    real_bars = group.len(),
                    capacity,
                    "period exceeds reset capacity, truncating tail bars"
                );
            }
            let day_of_week = group.first().map(|b| {
                DayOfWeek::from_hour_and_weekday(
                    chrono::Timelike::hour(&b.datetime),
                    chrono::Datelike::weekday(&b.datetime.date()),
                )
            });

            all_datetimes.extend(group.iter().take(length).map(|b| b.datetime));

            group.resize(capacity, Bar::padding());

            period_offsets.push(running_offset);
            period_lengths.push(length);
            running_offset += length;

            periods.push(Period {
                bars: group,
                length,
                day_of_week,
            });
        }

        Self {
            periods,
            period_offsets,
            period_lengths,
            all_datetimes,
            capacity,
        }
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// Invariant (iii): `sum(period_lengths) == len(all_datetimes)`.
    pub fn is_consistent(&self) -> bool {
        let summed: usize = self.period_lengths.iter().sum();
        summed == self.all_datetimes.len()
    }

    /// Invariant (i): within a period, real (non-padding) timestamps are strictly increasing.
    pub fn has_strictly_increasing_real_timestamps(&self) -> bool {
        self.periods.iter().all(|p| {
            p.bars[..p.length]
                .windows(2)
                .all(|w| w[1].datetime > w[0].datetime)
        })
    }
}
