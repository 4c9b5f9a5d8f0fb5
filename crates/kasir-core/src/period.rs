//! # Report Periods
//!
//! Resolves the date window a report covers, from either a named period or
//! explicit `YYYY-MM-DD` bounds.
//!
//! ## Resolution
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  period       start                         end                         │
//! │  ───────────  ────────────────────────────  ─────────────────────────   │
//! │  today        today 00:00                   today 23:59:59.999999999    │
//! │  yesterday    yesterday 00:00               yesterday, end of day       │
//! │  last-week    Monday of previous ISO week   Sunday of that week, EOD    │
//! │  last-month   1st of previous month         last day of that month, EOD │
//! │  week-to-date Monday of this ISO week       today, EOD                  │
//! │  month-to-date 1st of this month            today, EOD                  │
//! │  year-to-date Jan 1                         today, EOD                  │
//! │                                                                         │
//! │  no period    startDate or today 00:00      endDate (EOD) or today EOD  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All bounds are wall-clock times in the server's zone. [`LocalRange::to_utc`]
//! turns them into the instants the repositories filter on.

use chrono::{
    DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Nanoseconds from 00:00 to 23:59:59.999999999.
const DAY_SPAN_NANOS: i64 = 86_400 * 1_000_000_000 - 1;

const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Named Periods
// =============================================================================

/// Report windows that can be requested by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Today,
    Yesterday,
    LastWeek,
    LastMonth,
    WeekToDate,
    MonthToDate,
    YearToDate,
}

impl ReportPeriod {
    /// Every named period, in the order they are documented.
    pub const ALL: [ReportPeriod; 7] = [
        ReportPeriod::Today,
        ReportPeriod::Yesterday,
        ReportPeriod::LastWeek,
        ReportPeriod::LastMonth,
        ReportPeriod::WeekToDate,
        ReportPeriod::MonthToDate,
        ReportPeriod::YearToDate,
    ];

    /// Name used in query strings and URL paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::Today => "today",
            ReportPeriod::Yesterday => "yesterday",
            ReportPeriod::LastWeek => "last-week",
            ReportPeriod::LastMonth => "last-month",
            ReportPeriod::WeekToDate => "week-to-date",
            ReportPeriod::MonthToDate => "month-to-date",
            ReportPeriod::YearToDate => "year-to-date",
        }
    }

    /// Resolves the period relative to `today`.
    pub fn resolve(&self, today: NaiveDate) -> LocalRange {
        let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let first_of_month = today - Duration::days(today.day0() as i64);

        let (first, last) = match self {
            ReportPeriod::Today => (today, today),
            ReportPeriod::Yesterday => {
                let yesterday = today - Duration::days(1);
                (yesterday, yesterday)
            }
            ReportPeriod::LastWeek => (monday - Duration::days(7), monday - Duration::days(1)),
            ReportPeriod::LastMonth => {
                let last = first_of_month - Duration::days(1);
                (last - Duration::days(last.day0() as i64), last)
            }
            ReportPeriod::WeekToDate => (monday, today),
            ReportPeriod::MonthToDate => (first_of_month, today),
            ReportPeriod::YearToDate => (today - Duration::days(today.ordinal0() as i64), today),
        };

        LocalRange::days(first, last)
    }
}

impl FromStr for ReportPeriod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportPeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| CoreError::UnknownPeriod(s.to_string()))
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Ranges
// =============================================================================

/// Inclusive window in server-local wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Inclusive window as UTC instants, ready for storage queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Checks whether an instant falls inside the window (both ends inclusive).
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        *at >= self.start && *at <= self.end
    }
}

impl LocalRange {
    /// Start of `first` through end of `last`.
    pub fn days(first: NaiveDate, last: NaiveDate) -> Self {
        LocalRange {
            start: start_of_day(first),
            end: end_of_day(last),
        }
    }

    /// Rejects a window whose start comes after its end.
    pub fn ensure_ordered(&self) -> CoreResult<()> {
        if self.start > self.end {
            return Err(CoreError::InvalidRange {
                start: self.start.format(DATE_FORMAT).to_string(),
                end: self.end.format(DATE_FORMAT).to_string(),
            });
        }
        Ok(())
    }

    /// Interprets the wall-clock bounds in `tz` and converts them to UTC.
    ///
    /// An ambiguous local time (DST fall-back) takes the earlier instant; a
    /// skipped local time (DST spring-forward) is read as UTC.
    pub fn to_utc<Tz: TimeZone>(&self, tz: &Tz) -> DateRange {
        DateRange {
            start: local_to_utc(tz, &self.start),
            end: local_to_utc(tz, &self.end),
        }
    }
}

fn local_to_utc<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => Utc.from_utc_datetime(naive),
    }
}

/// 00:00:00.000000000 of `date`.
pub fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999999999 of `date`.
pub fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    start_of_day(date) + Duration::nanoseconds(DAY_SPAN_NANOS)
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolves a report window relative to `today`.
///
/// ## Rules
/// 1. A non-empty `period` wins; explicit dates are ignored. An unrecognised
///    name is an error.
/// 2. Otherwise `start`/`end` are parsed as `YYYY-MM-DD`. An empty or
///    unparsable start falls back to today 00:00; an empty or unparsable
///    end falls back to today end-of-day. A parsed end is moved to its
///    end-of-day.
///
/// The result is not checked for ordering; see [`LocalRange::ensure_ordered`].
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use kasir_core::period::resolve_range;
///
/// let today = NaiveDate::from_ymd_opt(2024, 5, 15).unwrap();
/// let range = resolve_range("2024-01-02", "2024-01-01", "", today).unwrap();
/// assert!(range.ensure_ordered().is_err());
/// ```
pub fn resolve_range(start: &str, end: &str, period: &str, today: NaiveDate) -> CoreResult<LocalRange> {
    let period = period.trim();
    if !period.is_empty() {
        return Ok(period.parse::<ReportPeriod>()?.resolve(today));
    }

    let start = parse_date(start).map_or_else(|| start_of_day(today), start_of_day);
    let end = parse_date(end).map_or_else(|| end_of_day(today), end_of_day);

    Ok(LocalRange { start, end })
}

/// Resolves, validates and converts a window using the server's clock and zone.
pub fn resolve_local_range(start: &str, end: &str, period: &str) -> CoreResult<DateRange> {
    let range = resolve_range(start, end, period, Local::now().date_naive())?;
    range.ensure_ordered()?;
    Ok(range.to_utc(&Local))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

// =============================================================================
// Unit Tests
// =============================================================================
