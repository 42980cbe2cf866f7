//! Calendar-date ranges and containment checks.
//!
//! A [`DateRange`] is a closed interval of [`NaiveDate`]s. Ranges built with
//! [`DateRange::new`] are guaranteed to have `start <= end`; ranges read back
//! from storage are built with [`DateRange::from_bounds`] and may be inverted,
//! which [`DateRange::is_well_formed`] reports. Deserializing goes through
//! [`DateRange::new`] and rejects inverted bounds.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a validated [`DateRange`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateRangeError {
    #[error("range start {start} is after end {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Which ends of an interval count as inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Inclusivity {
    /// `[start, end]`
    #[default]
    Inclusive,
    /// `(start, end)`
    Exclusive,
    /// `[start, end)`
    StartInclusive,
    /// `(start, end]`
    EndInclusive,
}

impl Inclusivity {
    fn includes_start(self) -> bool {
        matches!(self, Self::Inclusive | Self::StartInclusive)
    }

    fn includes_end(self) -> bool {
        matches!(self, Self::Inclusive | Self::EndInclusive)
    }
}

/// Returns whether `date` lies between `start` and `end`.
///
/// Total over any three dates. An inverted interval (`start > end`) contains
/// nothing.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use rate_core::calendar::{Inclusivity, is_between};
///
/// let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
///
/// assert!(is_between(start, start, end, Inclusivity::Inclusive));
/// assert!(!is_between(start, start, end, Inclusivity::Exclusive));
/// ```
pub fn is_between(
    date: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
    inclusivity: Inclusivity,
) -> bool {
    let after_start = if inclusivity.includes_start() {
        date >= start
    } else {
        date > start
    };
    let before_end = if inclusivity.includes_end() {
        date <= end
    } else {
        date < end
    };
    after_start && before_end
}

/// A closed interval of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DateBounds")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Serialized form of a [`DateRange`], checked on the way in.
#[derive(Deserialize)]
struct DateBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<DateBounds> for DateRange {
    type Error = DateRangeError;

    fn try_from(bounds: DateBounds) -> Result<Self, Self::Error> {
        DateRange::new(bounds.start, bounds.end)
    }
}

impl DateRange {
    /// Builds a validated range.
    ///
    /// # Errors
    ///
    /// Returns [`DateRangeError::Inverted`] when `start > end`.
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds a range without checking the bounds.
    ///
    /// Used for rows read back from storage, which may be inverted.
    pub fn from_bounds(
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        Self { start, end }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn is_well_formed(&self) -> bool {
        self.start <= self.end
    }

    /// Inclusive at both ends.
    pub fn contains(
        &self,
        day: NaiveDate,
    ) -> bool {
        is_between(day, self.start, self.end, Inclusivity::Inclusive)
    }

    /// `end - start` in whole days; `0` for a single-day range.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Every day in the range, ascending. Empty for an inverted range.
    pub fn days(&self) -> Days {
        Days::new(self.start, self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Ascending iterator over a closed span of days.
///
/// A clone replays only the days not yet yielded; call the producing method
/// again (e.g. [`DateRange::days`]) for a fresh pass.
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Days {
    pub(crate) fn new(
        first: NaiveDate,
        last: NaiveDate,
    ) -> Self {
        Self {
            next: Some(first),
            last,
        }
    }
}

impl Iterator for Days {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|day| *day <= self.last)?;
        self.next = current.succ_opt();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(day) if day <= self.last => {
                usize::try_from((self.last - day).num_days() + 1).unwrap_or(usize::MAX)
            }
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}
