use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;

use chrono::NaiveDate;
use rate_core::calendar::DateRange;
use rate_core::{AccountId, NewPriceEntry, RateKey, RateRepository, RepositoryError, RoomId};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading price data.
#[derive(Debug, Error)]
pub enum PriceEntryLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Row {row}: start date {start} is after end date {end}")]
    InvalidRange {
        row: usize,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Row {row}: price {price} must not be negative")]
    NegativePrice { row: usize, price: Decimal },

    #[error("Room {0} not found for this account (have you run the seeds?)")]
    RoomNotFound(RoomId),

    #[error("Rate plan '{rate_code}' not found for room {room_id}")]
    RatePlanNotFound { room_id: RoomId, rate_code: String },

    #[error("Row {row}: occupancy {occupancy} is outside 1..={max} for room {room_id}")]
    InvalidOccupancy {
        row: usize,
        room_id: RoomId,
        occupancy: u32,
        max: u32,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for PriceEntryLoaderError {
    fn from(err: csv::Error) -> Self {
        PriceEntryLoaderError::CsvParse(err.to_string())
    }
}

/// A single record from the prices CSV file.
///
/// - `room_id`: id of an existing room of the account
/// - `rate_code`: code of one of that room's rate plans (e.g. `BAR`)
/// - `occupancy`: guest count, 1 up to the room's maximum
/// - `start_date`, `end_date`: inclusive bounds as `YYYY-MM-DD`
/// - `price`: nightly price, e.g. `150.00`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PriceEntryRecord {
    pub room_id: i64,
    pub rate_code: String,
    pub occupancy: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub price: Decimal,
}

/// Parses the field text, keeping the written scale and every digit.
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.trim()
        .parse::<Decimal>()
        .map_err(serde::de::Error::custom)
}

impl PriceEntryRecord {
    pub fn key(&self) -> RateKey {
        RateKey::new(RoomId(self.room_id), self.rate_code.trim(), self.occupancy)
    }
}

/// Loader for price entries from CSV files.
///
/// Writes through the [`RateRepository`] trait, so it works with any
/// storage backend.
pub struct PriceEntryLoader;

impl PriceEntryLoader {
    /// Parse price records from a CSV reader.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<PriceEntryRecord>, PriceEntryLoaderError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: PriceEntryRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Load price records for `account_id`.
    ///
    /// Every record is validated before anything is written. Records are then
    /// grouped by calendar row and each row's entries are replaced by its
    /// group in file order, so loading the same file twice yields the same
    /// result.
    ///
    /// Each row is replaced atomically through
    /// [`RateRepository::replace_price_entries_for_key`]. Rows are not
    /// replaced together: if a later row fails, earlier rows stay loaded and
    /// rerunning the file finishes the job.
    ///
    /// Returns the number of entries inserted.
    pub async fn load<R: RateRepository + ?Sized>(
        repo: &R,
        account_id: AccountId,
        records: &[PriceEntryRecord],
    ) -> Result<usize, PriceEntryLoaderError> {
        let entries = Self::validate(repo, account_id, records).await?;

        let mut groups: BTreeMap<RateKey, Vec<NewPriceEntry>> = BTreeMap::new();
        for entry in entries {
            groups.entry(entry.key()).or_default().push(entry);
        }

        let mut inserted = 0;
        for (key, group_entries) in groups {
            let incoming = group_entries.len();
            let removed = repo
                .replace_price_entries_for_key(account_id, &key, group_entries)
                .await?;
            debug!(%key, removed, incoming, "replaced row prices");
            inserted += incoming;
        }

        info!(%account_id, inserted, "loaded price entries");
        Ok(inserted)
    }

    /// Checks every record against the account's rooms and rate plans and
    /// converts it into an entry ready to insert.
    async fn validate<R: RateRepository + ?Sized>(
        repo: &R,
        account_id: AccountId,
        records: &[PriceEntryRecord],
    ) -> Result<Vec<NewPriceEntry>, PriceEntryLoaderError> {
        let mut max_occupancy: HashMap<RoomId, u32> = HashMap::new();
        let plans: HashSet<(RoomId, String)> = repo
            .list_rate_plans(account_id)
            .await?
            .into_iter()
            .map(|plan| (plan.room_id, plan.code))
            .collect();

        let mut entries = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            // 1-based data row, header excluded.
            let row = index + 1;

            let range = DateRange::new(record.start_date, record.end_date).map_err(|_| {
                PriceEntryLoaderError::InvalidRange {
                    row,
                    start: record.start_date,
                    end: record.end_date,
                }
            })?;
            if record.price < Decimal::ZERO {
                return Err(PriceEntryLoaderError::NegativePrice {
                    row,
                    price: record.price,
                });
            }

            let key = record.key();
            let max = match max_occupancy.get(&key.room_id).copied() {
                Some(max) => max,
                None => {
                    let room = repo
                        .get_room(account_id, key.room_id)
                        .await
                        .map_err(|e| match e {
                            RepositoryError::NotFound => {
                                PriceEntryLoaderError::RoomNotFound(key.room_id)
                            }
                            other => PriceEntryLoaderError::Repository(other),
                        })?;
                    max_occupancy.insert(room.id, room.max_occupancy);
                    room.max_occupancy
                }
            };

            if !plans.contains(&(key.room_id, key.rate_code.clone())) {
                return Err(PriceEntryLoaderError::RatePlanNotFound {
                    room_id: key.room_id,
                    rate_code: key.rate_code,
                });
            }
            if key.occupancy == 0 || key.occupancy > max {
                return Err(PriceEntryLoaderError::InvalidOccupancy {
                    row,
                    room_id: key.room_id,
                    occupancy: key.occupancy,
                    max,
                });
            }

            entries.push(NewPriceEntry {
                account_id,
                room_id: key.room_id,
                rate_code: key.rate_code,
                occupancy: key.occupancy,
                range,
                price: record.price,
            });
        }

        Ok(entries)
    }
}
