use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{AccountId, RoomId};
use crate::calendar::DateRange;

/// Identifies one rate-calendar row: a room, one of its rate plans, and a
/// guest count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RateKey {
    pub room_id: RoomId,
    pub rate_code: String,
    pub occupancy: u32,
}

impl RateKey {
    pub fn new(
        room_id: RoomId,
        rate_code: impl Into<String>,
        occupancy: u32,
    ) -> Self {
        Self {
            room_id,
            rate_code: rate_code.into(),
            occupancy,
        }
    }
}

impl fmt::Display for RateKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "room {} / {} / {} guest(s)",
            self.room_id, self.rate_code, self.occupancy
        )
    }
}

/// Reasons a stored price entry cannot take part in price resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceEntryDefect {
    #[error("range start {start} is after end {end}")]
    InvertedRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("price {0} is negative")]
    NegativePrice(Decimal),
}

/// One stored price record covering a closed date interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub id: i64,
    pub account_id: AccountId,
    pub room_id: RoomId,
    pub rate_code: String,
    pub occupancy: u32,
    pub range: DateRange,
    pub price: Decimal,
}

impl PriceEntry {
    pub fn key(&self) -> RateKey {
        RateKey::new(self.room_id, self.rate_code.clone(), self.occupancy)
    }

    pub fn matches_key(
        &self,
        key: &RateKey,
    ) -> bool {
        self.room_id == key.room_id
            && self.occupancy == key.occupancy
            && self.rate_code == key.rate_code
    }

    /// Returns the first problem that makes this entry unusable, if any.
    ///
    /// Storage does not enforce range order or price sign, so entries read
    /// back from a repository are checked here before resolution.
    pub fn defect(&self) -> Option<PriceEntryDefect> {
        if !self.range.is_well_formed() {
            return Some(PriceEntryDefect::InvertedRange {
                start: self.range.start(),
                end: self.range.end(),
            });
        }
        if self.price < Decimal::ZERO {
            return Some(PriceEntryDefect::NegativePrice(self.price));
        }
        None
    }
}

/// For creating new price entries (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPriceEntry {
    pub account_id: AccountId,
    pub room_id: RoomId,
    pub rate_code: String,
    pub occupancy: u32,
    pub range: DateRange,
    pub price: Decimal,
}

impl NewPriceEntry {
    pub fn key(&self) -> RateKey {
        RateKey::new(self.room_id, self.rate_code.clone(), self.occupancy)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn date(
        month: u32,
        day: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    fn entry(
        range: DateRange,
        price: Decimal,
    ) -> PriceEntry {
        PriceEntry {
            id: 7,
            account_id: AccountId(1),
            room_id: RoomId(10),
            rate_code: "BAR".to_string(),
            occupancy: 2,
            range,
            price,
        }
    }

    #[test]
    fn key_collects_room_rate_and_occupancy() {
        let e = entry(DateRange::single_day(date(1, 1)), dec!(100));

        assert_eq!(e.key(), RateKey::new(RoomId(10), "BAR", 2));
        assert!(e.matches_key(&RateKey::new(RoomId(10), "BAR", 2)));
        assert!(!e.matches_key(&RateKey::new(RoomId(10), "BAR", 3)));
        assert!(!e.matches_key(&RateKey::new(RoomId(10), "NRF", 2)));
        assert!(!e.matches_key(&RateKey::new(RoomId(11), "BAR", 2)));
    }

    #[test]
    fn well_formed_entry_has_no_defect() {
        let e = entry(DateRange::from_bounds(date(1, 1), date(1, 31)), dec!(100));

        assert_eq!(e.defect(), None);
    }

    #[test]
    fn zero_price_is_not_a_defect() {
        let e = entry(DateRange::single_day(date(1, 1)), dec!(0));

        assert_eq!(e.defect(), None);
    }

    #[test]
    fn inverted_range_is_reported() {
        let e = entry(DateRange::from_bounds(date(1, 31), date(1, 1)), dec!(100));

        assert_eq!(
            e.defect(),
            Some(PriceEntryDefect::InvertedRange {
                start: date(1, 31),
                end: date(1, 1),
            })
        );
    }

    #[test]
    fn negative_price_is_reported() {
        let e = entry(DateRange::single_day(date(1, 1)), dec!(-5));

        assert_eq!(e.defect(), Some(PriceEntryDefect::NegativePrice(dec!(-5))));
    }

    #[test]
    fn rate_key_display_names_all_parts() {
        let key = RateKey::new(RoomId(3), "NRF-BB", 1);

        assert_eq!(key.to_string(), "room 3 / NRF-BB / 1 guest(s)");
    }
}
