//! Resolution of the applicable nightly price for a calendar day.
//!
//! Several stored entries may cover the same day, for example a broad
//! season-long default with a short promotion nested inside it. The narrowest
//! interval wins: candidates are stable-sorted by duration (shortest first)
//! and the first one containing the day supplies the price. Entries of equal
//! duration keep their original relative order.
//!
//! A day no entry covers resolves to [`Decimal::ZERO`], the "no price set"
//! sentinel. Malformed entries are skipped with a warning and never cause an
//! error.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use rate_core::calendar::DateRange;
//! use rate_core::pricing::resolve_price;
//! use rate_core::{AccountId, PriceEntry, RoomId};
//!
//! let day = |d| NaiveDate::from_ymd_opt(2025, 1, d).unwrap();
//! let entry = |id, range, price| PriceEntry {
//!     id,
//!     account_id: AccountId(1),
//!     room_id: RoomId(1),
//!     rate_code: "BAR".to_string(),
//!     occupancy: 2,
//!     range,
//!     price,
//! };
//!
//! let entries = vec![
//!     entry(1, DateRange::new(day(1), day(31)).unwrap(), dec!(100)),
//!     entry(2, DateRange::new(day(10), day(15)).unwrap(), dec!(150)),
//! ];
//!
//! assert_eq!(resolve_price(day(12), &entries), dec!(150));
//! assert_eq!(resolve_price(day(5), &entries), dec!(100));
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::warn;

use crate::PriceEntry;

/// Resolves prices over a fixed candidate set.
///
/// Filtering and sorting happen once in [`PriceResolver::new`], so a whole
/// month of cells can be resolved against the same instance.
#[derive(Debug, Clone)]
pub struct PriceResolver<'a> {
    ordered: Vec<&'a PriceEntry>,
}

impl<'a> PriceResolver<'a> {
    pub fn new(candidates: &'a [PriceEntry]) -> Self {
        Self::from_entries(candidates)
    }

    /// Builds a resolver from any borrowed sequence of entries, e.g. the
    /// entries of one calendar row filtered out of a larger snapshot.
    pub fn from_entries<I>(candidates: I) -> Self
    where
        I: IntoIterator<Item = &'a PriceEntry>,
    {
        let mut ordered: Vec<&'a PriceEntry> =
            candidates.into_iter().filter(|e| is_usable(e)).collect();

        // Stable: equal durations keep their input order.
        ordered.sort_by_key(|entry| entry.range.duration_days());

        Self { ordered }
    }

    /// The entry that supplies the price for `day`, if any.
    pub fn applicable_entry(
        &self,
        day: NaiveDate,
    ) -> Option<&'a PriceEntry> {
        self.ordered
            .iter()
            .copied()
            .find(|entry| entry.range.contains(day))
    }

    /// The price for `day`, or zero when no entry covers it.
    pub fn resolve(
        &self,
        day: NaiveDate,
    ) -> Decimal {
        self.applicable_entry(day)
            .map_or(Decimal::ZERO, |entry| entry.price)
    }

    /// Number of usable candidates after filtering.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

/// Resolves the price for a single day.
///
/// Convenience wrapper over [`PriceResolver`]; build a resolver directly when
/// resolving many days against the same candidates.
pub fn resolve_price(
    day: NaiveDate,
    candidates: &[PriceEntry],
) -> Decimal {
    PriceResolver::new(candidates).resolve(day)
}

fn is_usable(entry: &PriceEntry) -> bool {
    match entry.defect() {
        Some(defect) => {
            warn!(
                entry_id = entry.id,
                room_id = %entry.room_id,
                rate_code = %entry.rate_code,
                occupancy = entry.occupancy,
                %defect,
                "skipping malformed price entry"
            );
            false
        }
        None => true,
    }
}
