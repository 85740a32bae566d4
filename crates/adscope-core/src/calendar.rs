//! # Date Range Resolution
//!
//! Maps a symbolic range token to concrete calendar bounds.
//!
//! | token        | start                          | end                          |
//! |--------------|--------------------------------|------------------------------|
//! | `today`      | today                          | today                        |
//! | `this_week`  | first day of the current week  | last day of the current week |
//! | `last_week`  | first day of the previous week | last day of the previous week|
//! | `last_month` | first day of previous month    | last day of previous month   |
//! | `last_year`  | January 1st of previous year   | December 31st of previous year|
//! | `maximum`    | today minus 10 years           | today                        |
//!
//! Unknown tokens resolve to no bounds at all, never to a default range.

use crate::AdscopeError;
use chrono::{Datelike, Days, Local, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Span of the `maximum` range.
pub const MAXIMUM_RANGE_YEARS: u32 = 10;

/// Wire format of both bounds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// TOKENS
// =============================================================================

/// A symbolic date range.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum DateRange {
    Today,
    ThisWeek,
    LastWeek,
    LastMonth,
    LastYear,
    #[default]
    Maximum,
}

impl DateRange {
    pub const ALL: [DateRange; 6] = [
        DateRange::Maximum,
        DateRange::Today,
        DateRange::ThisWeek,
        DateRange::LastWeek,
        DateRange::LastMonth,
        DateRange::LastYear,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::ThisWeek => "this_week",
            Self::LastWeek => "last_week",
            Self::LastMonth => "last_month",
            Self::LastYear => "last_year",
            Self::Maximum => "maximum",
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = AdscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| AdscopeError::MalformedToken(s.to_string()))
    }
}

/// First day of the calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    const fn weekday(self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Sunday => Weekday::Sun,
        }
    }

    /// Days elapsed between the start of the week and `date`, in `0..7`.
    fn offset(self, date: NaiveDate) -> u64 {
        let day = date.weekday().num_days_from_monday();
        let start = self.weekday().num_days_from_monday();
        u64::from((day + 7 - start) % 7)
    }
}

// =============================================================================
// BOUNDS
// =============================================================================

/// Concrete, inclusive date bounds with `start_date <= end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl DateBounds {
    /// `start_date` as `YYYY-MM-DD`.
    #[must_use]
    pub fn start(&self) -> String {
        self.start_date.format(DATE_FORMAT).to_string()
    }

    /// `end_date` as `YYYY-MM-DD`.
    #[must_use]
    pub fn end(&self) -> String {
        self.end_date.format(DATE_FORMAT).to_string()
    }
}

// =============================================================================
// CLOCK
// =============================================================================

/// Source of "now" for range resolution.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Translates range tokens into bounds relative to a reference date.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangeResolver {
    week_start: WeekStart,
}

impl DateRangeResolver {
    #[must_use]
    pub const fn new(week_start: WeekStart) -> Self {
        Self { week_start }
    }

    #[must_use]
    pub const fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Resolve a raw token.
    ///
    /// Returns `None` for tokens outside the enumeration; callers must treat
    /// that as "bounds absent".
    #[must_use]
    pub fn resolve(&self, token: &str, today: NaiveDate) -> Option<DateBounds> {
        let range = token.parse::<DateRange>().ok()?;
        self.bounds(range, today)
    }

    /// Resolve a parsed range. `None` only at the edges of the representable
    /// calendar.
    #[must_use]
    pub fn bounds(&self, range: DateRange, today: NaiveDate) -> Option<DateBounds> {
        let (start_date, end_date) = match range {
            DateRange::Today => (today, today),
            DateRange::ThisWeek => {
                let start = today.checked_sub_days(Days::new(self.week_start.offset(today)))?;
                (start, start.checked_add_days(Days::new(6))?)
            }
            DateRange::LastWeek => {
                let this_week = today.checked_sub_days(Days::new(self.week_start.offset(today)))?;
                (
                    this_week.checked_sub_days(Days::new(7))?,
                    this_week.pred_opt()?,
                )
            }
            DateRange::LastMonth => {
                let end = today.with_day(1)?.pred_opt()?;
                (end.with_day(1)?, end)
            }
            DateRange::LastYear => {
                let year = today.year().checked_sub(1)?;
                (
                    NaiveDate::from_ymd_opt(year, 1, 1)?,
                    NaiveDate::from_ymd_opt(year, 12, 31)?,
                )
            }
            DateRange::Maximum => (
                today.checked_sub_months(Months::new(MAXIMUM_RANGE_YEARS * 12))?,
                today,
            ),
        };
        Some(DateBounds {
            start_date,
            end_date,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn resolve(token: &str, today: NaiveDate) -> (String, String) {
        let bounds = DateRangeResolver::default()
            .resolve(token, today)
            .expect("known token");
        (bounds.start(), bounds.end())
    }

    fn thursday() -> NaiveDate {
        date(2026, 10, 15)
    }

    #[test]
    fn today_is_single_day() {
        assert_eq!(
            resolve("today", thursday()),
            ("2026-10-15".into(), "2026-10-15".into())
        );
    }

    #[test]
    fn this_week_starts_monday() {
        assert_eq!(
            resolve("this_week", thursday()),
            ("2026-10-12".into(), "2026-10-18".into())
        );
    }

    #[test]
    fn this_week_on_monday_starts_same_day() {
        assert_eq!(
            resolve("this_week", date(2026, 10, 12)),
            ("2026-10-12".into(), "2026-10-18".into())
        );
    }

    #[test]
    fn sunday_week_start_is_configurable() {
        let resolver = DateRangeResolver::new(WeekStart::Sunday);
        let bounds = resolver
            .bounds(DateRange::ThisWeek, thursday())
            .expect("bounds");
        assert_eq!(bounds.start(), "2026-10-11");
        assert_eq!(bounds.end(), "2026-10-17");

        let last = resolver
            .bounds(DateRange::LastWeek, thursday())
            .expect("bounds");
        assert_eq!(last.start(), "2026-10-04");
        assert_eq!(last.end(), "2026-10-10");
    }

    #[test]
    fn last_week_is_previous_full_week() {
        assert_eq!(
            resolve("last_week", thursday()),
            ("2026-10-05".into(), "2026-10-11".into())
        );
    }

    #[test]
    fn last_month_across_year_boundary() {
        assert_eq!(
            resolve("last_month", date(2026, 1, 20)),
            ("2025-12-01".into(), "2025-12-31".into())
        );
        assert_eq!(
            resolve("last_month", date(2024, 3, 31)),
            ("2024-02-01".into(), "2024-02-29".into())
        );
    }

    #[test]
    fn last_year_is_full_calendar_year() {
        assert_eq!(
            resolve("last_year", thursday()),
            ("2025-01-01".into(), "2025-12-31".into())
        );
    }

    #[test]
    fn maximum_spans_ten_years() {
        assert_eq!(
            resolve("maximum", thursday()),
            ("2016-10-15".into(), "2026-10-15".into())
        );
    }

    #[test]
    fn maximum_from_leap_day_clamps() {
        assert_eq!(
            resolve("maximum", date(2024, 2, 29)),
            ("2014-02-28".into(), "2024-02-29".into())
        );
    }

    #[test]
    fn unknown_token_has_no_bounds() {
        let resolver = DateRangeResolver::default();
        assert_eq!(resolver.resolve("yesterday", thursday()), None);
        assert_eq!(resolver.resolve("", thursday()), None);
        assert!(matches!(
            "Today".parse::<DateRange>(),
            Err(AdscopeError::MalformedToken(_))
        ));
    }

    #[test]
    fn fixed_clock_reports_its_date() {
        assert_eq!(FixedClock(thursday()).today(), thursday());
    }
}
