//! Price creation form pre-filled from a completed selection.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use super::machine::CompletedSelection;
use crate::calendar::DateRange;
use crate::{AccountId, NewPriceEntry, RateKey};

/// Validation failures for the price field of a [`PriceDraft`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceDraftError {
    #[error("price is required")]
    MissingPrice,

    #[error("price '{0}' must be a valid number")]
    InvalidPrice(String),

    #[error("price {0} must not be negative")]
    NegativePrice(Decimal),
}

/// The creation form opened when a selection completes.
///
/// Key and range come from the selection and are not editable; the user only
/// supplies the price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceDraft {
    pub account_id: AccountId,
    pub key: RateKey,
    pub range: DateRange,
}

impl PriceDraft {
    pub fn from_selection(
        account_id: AccountId,
        selection: CompletedSelection,
    ) -> Self {
        Self {
            account_id,
            key: selection.key,
            range: selection.range,
        }
    }

    /// Validates `price_input` and builds the entry to persist.
    ///
    /// Accepts surrounding whitespace and `,` thousands separators.
    ///
    /// # Errors
    ///
    /// * [`PriceDraftError::MissingPrice`] for empty input.
    /// * [`PriceDraftError::InvalidPrice`] when the input is not a number.
    /// * [`PriceDraftError::NegativePrice`] for values below zero.
    pub fn submit(
        &self,
        price_input: &str,
    ) -> Result<NewPriceEntry, PriceDraftError> {
        let price = parse_price(price_input)?;
        Ok(NewPriceEntry {
            account_id: self.account_id,
            room_id: self.key.room_id,
            rate_code: self.key.rate_code.clone(),
            occupancy: self.key.occupancy,
            range: self.range,
            price,
        })
    }
}

fn parse_price(input: &str) -> Result<Decimal, PriceDraftError> {
    let normalized = input.trim().replace(',', "");
    if normalized.is_empty() {
        return Err(PriceDraftError::MissingPrice);
    }
    let price: Decimal = normalized.parse().map_err(|e| {
        warn!(input = %input, "invalid price: {}", e);
        PriceDraftError::InvalidPrice(input.to_string())
    })?;
    if price < Decimal::ZERO {
        return Err(PriceDraftError::NegativePrice(price));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::RoomId;

    fn draft() -> PriceDraft {
        let start = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        PriceDraft::from_selection(
            AccountId(4),
            CompletedSelection {
                key: RateKey::new(RoomId(9), "NRF", 2),
                range: DateRange::new(start, end).unwrap(),
            },
        )
    }

    #[test]
    fn submit_builds_entry_from_selection() {
        let d = draft();

        let entry = d.submit("150.00").unwrap();

        assert_eq!(
            entry,
            NewPriceEntry {
                account_id: AccountId(4),
                room_id: RoomId(9),
                rate_code: "NRF".to_string(),
                occupancy: 2,
                range: d.range,
                price: dec!(150.00),
            }
        );
    }

    #[test]
    fn submit_accepts_thousands_separator_and_whitespace() {
        let entry = draft().submit("  1,250.50 ").unwrap();

        assert_eq!(entry.price, dec!(1250.50));
    }

    #[test]
    fn submit_accepts_zero() {
        assert_eq!(draft().submit("0").unwrap().price, Decimal::ZERO);
    }

    #[test]
    fn submit_rejects_empty_input() {
        assert_eq!(draft().submit("   "), Err(PriceDraftError::MissingPrice));
    }

    #[test]
    fn submit_rejects_non_numeric_input() {
        assert_eq!(
            draft().submit("abc"),
            Err(PriceDraftError::InvalidPrice("abc".to_string()))
        );
    }

    #[test]
    fn submit_rejects_negative_price() {
        assert_eq!(
            draft().submit("-20"),
            Err(PriceDraftError::NegativePrice(dec!(-20)))
        );
    }
}
