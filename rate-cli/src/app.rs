//! Calendar workflows shared by the `kolibri-rates` subcommands.

use chrono::NaiveDate;
use rate_core::calendar::{RateCalendar, YearMonth};
use rate_core::db::RepositoryRegistry;
use rate_core::selection::{PriceDraftError, SelectionEvent};
use rate_core::{AccountId, PriceEntry, RateKey, RateRepository, RepositoryError};
use rate_db_sqlite::SqliteRepositoryFactory;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no calendar row for {0}")]
    UnknownRow(RateKey),

    #[error("selection abandoned: end date {to} is before start date {from}")]
    SelectionAbandoned { from: NaiveDate, to: NaiveDate },

    #[error("invalid price: {0}")]
    Draft(#[from] PriceDraftError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Registry with every backend compiled into this binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Fetches the account's catalogue and price snapshot for one month view.
pub async fn load_calendar(
    repo: &dyn RateRepository,
    account_id: AccountId,
    month: YearMonth,
) -> Result<RateCalendar, RepositoryError> {
    let rooms = repo.list_rooms(account_id).await?;
    let rate_plans = repo.list_rate_plans(account_id).await?;
    let entries = repo.list_price_entries(account_id).await?;
    debug!(
        %account_id,
        %month,
        rooms = rooms.len(),
        rate_plans = rate_plans.len(),
        entries = entries.len(),
        "loaded calendar data"
    );
    Ok(RateCalendar::new(
        account_id, month, rooms, rate_plans, entries,
    ))
}

/// Prices `from..=to` on one row the way the grid does it: two clicks, the
/// creation form, persist, re-fetch.
///
/// The selection is back to idle when this returns, whether or not it
/// succeeded.
pub async fn set_price(
    repo: &dyn RateRepository,
    calendar: &mut RateCalendar,
    key: &RateKey,
    from: NaiveDate,
    to: NaiveDate,
    price_input: &str,
) -> Result<PriceEntry, AppError> {
    if !calendar.rows().iter().any(|row| &row.key == key) {
        return Err(AppError::UnknownRow(key.clone()));
    }

    calendar.clear_selection();
    calendar.click(key, from);
    match calendar.click(key, to) {
        Some(SelectionEvent::Completed(_)) => {}
        _ => {
            calendar.clear_selection();
            return Err(AppError::SelectionAbandoned { from, to });
        }
    }

    let Some(draft) = calendar.open_draft() else {
        return Err(AppError::SelectionAbandoned { from, to });
    };
    let new_entry = draft.submit(price_input)?;

    let entry = repo.create_price_entry(new_entry).await?;
    info!(id = entry.id, %key, range = %entry.range, price = %entry.price, "price saved");

    refresh(repo, calendar).await?;
    Ok(entry)
}

/// Deletes one stored price and re-fetches the snapshot.
pub async fn clear_price(
    repo: &dyn RateRepository,
    calendar: &mut RateCalendar,
    id: i64,
) -> Result<(), RepositoryError> {
    repo.delete_price_entry(calendar.account_id(), id).await?;
    info!(id, account_id = %calendar.account_id(), "price removed");
    refresh(repo, calendar).await
}

async fn refresh(
    repo: &dyn RateRepository,
    calendar: &mut RateCalendar,
) -> Result<(), RepositoryError> {
    let entries = repo.list_price_entries(calendar.account_id()).await?;
    calendar.replace_entries(entries);
    Ok(())
}
