//! Month arithmetic and day-of-month enumeration.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::date_range::{DateRange, Days};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearMonthError {
    #[error("month {0} is outside 1..=12")]
    InvalidMonth(u32),

    #[error("year {0} is outside the supported calendar range")]
    OutOfRange(i32),

    #[error("invalid year-month '{0}', expected YYYY-MM")]
    Parse(String),
}

/// A calendar month, e.g. `2025-01`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    /// # Errors
    ///
    /// * [`YearMonthError::InvalidMonth`] when `month` is not in `1..=12`.
    /// * [`YearMonthError::OutOfRange`] when the month cannot be represented.
    pub fn new(
        year: i32,
        month: u32,
    ) -> Result<Self, YearMonthError> {
        if !(1..=12).contains(&month) {
            return Err(YearMonthError::InvalidMonth(month));
        }
        let first =
            NaiveDate::from_ymd_opt(year, month, 1).ok_or(YearMonthError::OutOfRange(year))?;
        let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))
            .ok_or(YearMonthError::OutOfRange(year))?;
        Ok(Self { first, last })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = date
            .with_day(days_in_month(date.year(), date.month()))
            .unwrap_or(date);
        Self { first, last }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn days_in_month(&self) -> u32 {
        self.last.day()
    }

    pub fn contains(
        &self,
        day: NaiveDate,
    ) -> bool {
        self.as_range().contains(day)
    }

    pub fn as_range(&self) -> DateRange {
        DateRange::from_bounds(self.first, self.last)
    }

    /// Every day of the month in ascending order.
    ///
    /// Lazy and finite; call again for a fresh pass.
    ///
    /// ```
    /// use rate_core::calendar::YearMonth;
    ///
    /// let february = YearMonth::new(2024, 2).unwrap();
    /// assert_eq!(february.days().count(), 29);
    /// assert_eq!(february.days().count(), 29);
    /// ```
    pub fn days(&self) -> Days {
        Days::new(self.first, self.last)
    }

    /// Shifts by `delta` months; `None` outside chrono's calendar range.
    pub fn add_months(
        &self,
        delta: i32,
    ) -> Option<Self> {
        let (year, month) = shift(self.year(), self.month(), delta)?;
        Self::new(year, month).ok()
    }

    pub fn next(&self) -> Option<Self> {
        self.add_months(1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.add_months(-1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = YearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('-')
            .ok_or_else(|| YearMonthError::Parse(s.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| YearMonthError::Parse(s.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| YearMonthError::Parse(s.to_string()))?;
        Self::new(year, month)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = YearMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// Adds `delta` months to `date`, clamping the day to the target month's
/// length (Jan 31 + 1 month is Feb 28, or Feb 29 in a leap year).
///
/// Returns `None` only when the result leaves chrono's calendar range.
///
/// ```
/// use chrono::NaiveDate;
/// use rate_core::calendar::add_months;
///
/// let jan_31 = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
/// assert_eq!(add_months(jan_31, 1), NaiveDate::from_ymd_opt(2025, 2, 28));
/// ```
pub fn add_months(
    date: NaiveDate,
    delta: i32,
) -> Option<NaiveDate> {
    let target = YearMonth::of(date).add_months(delta)?;
    target
        .first_day()
        .with_day(date.day().min(target.days_in_month()))
}

pub fn subtract_months(
    date: NaiveDate,
    delta: i32,
) -> Option<NaiveDate> {
    add_months(date, delta.checked_neg()?)
}

fn shift(
    year: i32,
    month: u32,
    delta: i32,
) -> Option<(i32, u32)> {
    let total = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(delta);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12) + 1).ok()?;
    Some((year, month))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(
    year: i32,
    month: u32,
) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}
