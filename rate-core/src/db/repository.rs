use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    AccountId, NewPriceEntry, NewRatePlan, NewRoom, PriceEntry, RateKey, RatePlan, Room, RoomId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage for the rate calendar. Every query is scoped to one account.
#[async_trait]
pub trait RateRepository: Send + Sync {
    // Rooms
    async fn list_rooms(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Room>, RepositoryError>;

    async fn get_room(
        &self,
        account_id: AccountId,
        room_id: RoomId,
    ) -> Result<Room, RepositoryError>;

    async fn insert_room(
        &self,
        room: NewRoom,
    ) -> Result<Room, RepositoryError>;

    // Rate plans
    async fn list_rate_plans(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<RatePlan>, RepositoryError>;

    async fn insert_rate_plan(
        &self,
        plan: NewRatePlan,
    ) -> Result<RatePlan, RepositoryError>;

    // Price entries, returned in insertion order
    async fn list_price_entries(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<PriceEntry>, RepositoryError>;

    async fn list_price_entries_for_key(
        &self,
        account_id: AccountId,
        key: &RateKey,
    ) -> Result<Vec<PriceEntry>, RepositoryError>;

    async fn create_price_entry(
        &self,
        entry: NewPriceEntry,
    ) -> Result<PriceEntry, RepositoryError>;

    /// Fails with [`RepositoryError::NotFound`] when no entry with `id`
    /// belongs to the account.
    async fn delete_price_entry(
        &self,
        account_id: AccountId,
        id: i64,
    ) -> Result<(), RepositoryError>;

    /// Swaps every entry of one calendar row for `entries` as a single unit:
    /// on error the row keeps its previous entries. Only `range` and `price`
    /// are taken from `entries`; the row comes from `account_id` and `key`.
    /// Returns the number of entries removed.
    async fn replace_price_entries_for_key(
        &self,
        account_id: AccountId,
        key: &RateKey,
        entries: Vec<NewPriceEntry>,
    ) -> Result<u64, RepositoryError>;
}
