use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rate_core::calendar::DateRange;
use rate_core::{
    AccountId, MealPlan, NewPriceEntry, NewRatePlan, NewRoom, PriceEntry, RateKey, RatePlan,
    RateRepository, RepositoryError, Room, RoomId,
};
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Row, Sqlite};
use tracing::{debug, info, warn};

use crate::decimal::{decimal_to_text, get_optional_decimal};

const PRICE_ENTRY_COLUMNS: &str =
    "id, account_id, room_id, rate_code, occupancy, start_date, end_date, price";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connects to `database_url`: a file path, a `sqlite:` URL, or
    /// `:memory:`. Missing database files are created.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {}", database_url))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to an in-memory database is a separate database.
        let max_connections = if is_in_memory(database_url) { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        debug!(database_url, max_connections, "connected to sqlite");
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            info!(file = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_price_entries<'q>(
        &self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Result<Vec<PriceEntry>, RepositoryError> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(entry) = row_to_price_entry(row)? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_room(row: &sqlx::sqlite::SqliteRow) -> Result<Room, RepositoryError> {
    Ok(Room {
        id: RoomId(row.try_get("id").map_err(db_err)?),
        account_id: AccountId(row.try_get("account_id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        max_occupancy: row.try_get("max_occupancy").map_err(db_err)?,
    })
}

fn row_to_rate_plan(row: &sqlx::sqlite::SqliteRow) -> Result<RatePlan, RepositoryError> {
    let meal_plan_str: String = row.try_get("meal_plan").map_err(db_err)?;
    let meal_plan = MealPlan::parse(&meal_plan_str).ok_or_else(|| {
        RepositoryError::Database(format!("Invalid meal plan: {}", meal_plan_str))
    })?;

    Ok(RatePlan {
        id: row.try_get("id").map_err(db_err)?,
        account_id: AccountId(row.try_get("account_id").map_err(db_err)?),
        room_id: RoomId(row.try_get("room_id").map_err(db_err)?),
        code: row.try_get("code").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        meal_plan,
        refundable: row.try_get("refundable").map_err(db_err)?,
    })
}

/// Converts a stored price row. Rows whose price is NULL or not a number are
/// skipped with a warning so one bad row cannot hide a whole calendar.
fn row_to_price_entry(row: &sqlx::sqlite::SqliteRow) -> Result<Option<PriceEntry>, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(db_err)?;

    let price = match get_optional_decimal(row, "price") {
        Ok(Some(price)) => price,
        Ok(None) => {
            warn!(entry_id = id, "skipping price entry without a price");
            return Ok(None);
        }
        Err(e) => {
            warn!(entry_id = id, error = %e, "skipping price entry with unreadable price");
            return Ok(None);
        }
    };

    let start: NaiveDate = row.try_get("start_date").map_err(db_err)?;
    let end: NaiveDate = row.try_get("end_date").map_err(db_err)?;

    Ok(Some(PriceEntry {
        id,
        account_id: AccountId(row.try_get("account_id").map_err(db_err)?),
        room_id: RoomId(row.try_get("room_id").map_err(db_err)?),
        rate_code: row.try_get("rate_code").map_err(db_err)?,
        occupancy: row.try_get("occupancy").map_err(db_err)?,
        range: DateRange::from_bounds(start, end),
        price,
    }))
}

#[async_trait]
impl RateRepository for SqliteRepository {
    async fn list_rooms(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<Room>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, account_id, name, max_occupancy
             FROM rooms WHERE account_id = ? ORDER BY name, id",
        )
        .bind(account_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_room).collect()
    }

    async fn get_room(
        &self,
        account_id: AccountId,
        room_id: RoomId,
    ) -> Result<Room, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, account_id, name, max_occupancy
             FROM rooms WHERE account_id = ? AND id = ?",
        )
        .bind(account_id.0)
        .bind(room_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_room(&row)
    }

    async fn insert_room(
        &self,
        room: NewRoom,
    ) -> Result<Room, RepositoryError> {
        let result =
            sqlx::query("INSERT INTO rooms (account_id, name, max_occupancy) VALUES (?, ?, ?)")
                .bind(room.account_id.0)
                .bind(&room.name)
                .bind(room.max_occupancy)
                .execute(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(Room {
            id: RoomId(result.last_insert_rowid()),
            account_id: room.account_id,
            name: room.name,
            max_occupancy: room.max_occupancy,
        })
    }

    async fn list_rate_plans(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<RatePlan>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT id, account_id, room_id, code, name, meal_plan, refundable
             FROM rate_plans WHERE account_id = ? ORDER BY room_id, code",
        )
        .bind(account_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_rate_plan).collect()
    }

    async fn insert_rate_plan(
        &self,
        plan: NewRatePlan,
    ) -> Result<RatePlan, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO rate_plans (account_id, room_id, code, name, meal_plan, refundable)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(plan.account_id.0)
        .bind(plan.room_id.0)
        .bind(&plan.code)
        .bind(&plan.name)
        .bind(plan.meal_plan.as_str())
        .bind(plan.refundable)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(RatePlan {
            id: result.last_insert_rowid(),
            account_id: plan.account_id,
            room_id: plan.room_id,
            code: plan.code,
            name: plan.name,
            meal_plan: plan.meal_plan,
            refundable: plan.refundable,
        })
    }

    async fn list_price_entries(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<PriceEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {PRICE_ENTRY_COLUMNS} FROM price_entries WHERE account_id = ? ORDER BY id"
        );
        self.fetch_price_entries(sqlx::query(&sql).bind(account_id.0))
            .await
    }

    async fn list_price_entries_for_key(
        &self,
        account_id: AccountId,
        key: &RateKey,
    ) -> Result<Vec<PriceEntry>, RepositoryError> {
        let sql = format!(
            "SELECT {PRICE_ENTRY_COLUMNS} FROM price_entries
             WHERE account_id = ? AND room_id = ? AND rate_code = ? AND occupancy = ?
             ORDER BY id"
        );
        self.fetch_price_entries(
            sqlx::query(&sql)
                .bind(account_id.0)
                .bind(key.room_id.0)
                .bind(key.rate_code.as_str())
                .bind(key.occupancy),
        )
        .await
    }

    async fn create_price_entry(
        &self,
        entry: NewPriceEntry,
    ) -> Result<PriceEntry, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO price_entries (
                account_id, room_id, rate_code, occupancy, start_date, end_date, price
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.account_id.0)
        .bind(entry.room_id.0)
        .bind(&entry.rate_code)
        .bind(entry.occupancy)
        .bind(entry.range.start())
        .bind(entry.range.end())
        .bind(decimal_to_text(entry.price))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        debug!(entry_id = id, key = %entry.key(), "created price entry");

        Ok(PriceEntry {
            id,
            account_id: entry.account_id,
            room_id: entry.room_id,
            rate_code: entry.rate_code,
            occupancy: entry.occupancy,
            range: entry.range,
            price: entry.price,
        })
    }

    async fn delete_price_entry(
        &self,
        account_id: AccountId,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM price_entries WHERE account_id = ? AND id = ?")
            .bind(account_id.0)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn replace_price_entries_for_key(
        &self,
        account_id: AccountId,
        key: &RateKey,
        entries: Vec<NewPriceEntry>,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let removed = sqlx::query(
            "DELETE FROM price_entries
             WHERE account_id = ? AND room_id = ? AND rate_code = ? AND occupancy = ?",
        )
        .bind(account_id.0)
        .bind(key.room_id.0)
        .bind(key.rate_code.as_str())
        .bind(key.occupancy)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?
        .rows_affected();

        let inserted = entries.len();
        for entry in entries {
            sqlx::query(
                "INSERT INTO price_entries (
                    account_id, room_id, rate_code, occupancy, start_date, end_date, price
                ) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(account_id.0)
            .bind(key.room_id.0)
            .bind(key.rate_code.as_str())
            .bind(key.occupancy)
            .bind(entry.range.start())
            .bind(entry.range.end())
            .bind(decimal_to_text(entry.price))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        // Dropping `tx` on an earlier return rolls the delete back.
        tx.commit().await.map_err(db_err)?;
        debug!(%key, removed, inserted, "replaced row prices");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    /// In-memory sink for the test subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines_with(
            &self,
            needles: &[&str],
        ) -> Vec<String> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .filter(|line| needles.iter().all(|needle| line.contains(needle)))
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture_warnings() -> (tracing::subscriber::DefaultGuard, CapturedLogs) {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(logs.clone())
            .finish();
        (tracing::subscriber::set_default(subscriber), logs)
    }

    const ACCOUNT: AccountId = AccountId(1);

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn date(
        month: u32,
        day: u32,
    ) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    async fn insert_test_room(
        repo: &SqliteRepository,
        account_id: AccountId,
        name: &str,
    ) -> Room {
        repo.insert_room(NewRoom {
            account_id,
            name: name.to_string(),
            max_occupancy: 2,
        })
        .await
        .expect("Failed to insert test room")
    }

    fn new_entry(
        room_id: RoomId,
        start: NaiveDate,
        end: NaiveDate,
        price: Decimal,
    ) -> NewPriceEntry {
        NewPriceEntry {
            account_id: ACCOUNT,
            room_id,
            rate_code: "BAR".to_string(),
            occupancy: 2,
            range: DateRange::new(start, end).unwrap(),
            price,
        }
    }

    // rooms

    #[tokio::test]
    async fn test_insert_and_get_room() {
        let repo = setup_test_db().await;

        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        let fetched = repo.get_room(ACCOUNT, room.id).await.expect("Should find room");

        assert_eq!(fetched, room);
    }

    #[tokio::test]
    async fn test_get_room_of_other_account_not_found() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, AccountId(2), "Double").await;

        let result = repo.get_room(ACCOUNT, room.id).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_list_rooms_scoped_and_ordered_by_name() {
        let repo = setup_test_db().await;
        insert_test_room(&repo, ACCOUNT, "Suite").await;
        insert_test_room(&repo, ACCOUNT, "Double").await;
        insert_test_room(&repo, AccountId(2), "Attic").await;

        let names: Vec<_> = repo
            .list_rooms(ACCOUNT)
            .await
            .expect("Should list rooms")
            .into_iter()
            .map(|room| room.name)
            .collect();

        assert_eq!(names, vec!["Double", "Suite"]);
    }

    // rate plans

    #[tokio::test]
    async fn test_insert_and_list_rate_plans() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;

        let plan = repo
            .insert_rate_plan(NewRatePlan {
                account_id: ACCOUNT,
                room_id: room.id,
                code: "NRF".to_string(),
                name: "Non-refundable".to_string(),
                meal_plan: MealPlan::Breakfast,
                refundable: false,
            })
            .await
            .expect("Should insert rate plan");

        let plans = repo.list_rate_plans(ACCOUNT).await.expect("Should list plans");

        assert_eq!(plans, vec![plan]);
        assert!(repo.list_rate_plans(AccountId(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_rate_code_per_room_rejected() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        let plan = NewRatePlan {
            account_id: ACCOUNT,
            room_id: room.id,
            code: "BAR".to_string(),
            name: "Best available".to_string(),
            meal_plan: MealPlan::RoomOnly,
            refundable: true,
        };
        repo.insert_rate_plan(plan.clone()).await.unwrap();

        let result = repo.insert_rate_plan(plan).await;

        assert!(matches!(result, Err(RepositoryError::Database(_))));
    }

    // price entries

    #[tokio::test]
    async fn test_create_and_list_price_entries() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;

        let created = repo
            .create_price_entry(new_entry(room.id, date(1, 1), date(1, 31), dec!(100.50)))
            .await
            .expect("Should create price entry");

        let entries = repo
            .list_price_entries(ACCOUNT)
            .await
            .expect("Should list price entries");

        assert_eq!(entries, vec![created]);
        assert_eq!(entries[0].price, dec!(100.50));
        assert_eq!(entries[0].range.start(), date(1, 1));
    }

    #[tokio::test]
    async fn test_list_price_entries_in_insertion_order() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        for (start, end, price) in [
            (date(1, 10), date(1, 15), dec!(150)),
            (date(1, 1), date(1, 31), dec!(100)),
        ] {
            repo.create_price_entry(new_entry(room.id, start, end, price))
                .await
                .unwrap();
        }

        let prices: Vec<_> = repo
            .list_price_entries(ACCOUNT)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.price)
            .collect();

        assert_eq!(prices, vec![dec!(150), dec!(100)]);
    }

    #[tokio::test]
    async fn test_list_price_entries_for_key() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        repo.create_price_entry(new_entry(room.id, date(1, 1), date(1, 31), dec!(100)))
            .await
            .unwrap();
        repo.create_price_entry(NewPriceEntry {
            occupancy: 1,
            ..new_entry(room.id, date(1, 1), date(1, 31), dec!(80))
        })
        .await
        .unwrap();

        let key = RateKey::new(room.id, "BAR", 1);
        let entries = repo
            .list_price_entries_for_key(ACCOUNT, &key)
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].price, dec!(80));
        assert!(entries[0].matches_key(&key));
    }

    #[tokio::test]
    async fn test_price_entries_scoped_to_account() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        repo.create_price_entry(new_entry(room.id, date(1, 1), date(1, 31), dec!(100)))
            .await
            .unwrap();

        assert!(repo.list_price_entries(AccountId(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rows_with_bad_price_are_skipped() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        sqlx::query(
            "INSERT INTO price_entries
                (account_id, room_id, rate_code, occupancy, start_date, end_date, price)
             VALUES
                (1, ?, 'BAR', 2, '2025-01-01', '2025-01-31', 'abc'),
                (1, ?, 'BAR', 2, '2025-01-01', '2025-01-31', NULL),
                (1, ?, 'BAR', 2, '2025-01-10', '2025-01-15', '150')",
        )
        .bind(room.id.0)
        .bind(room.id.0)
        .bind(room.id.0)
        .execute(repo.pool())
        .await
        .expect("Failed to insert raw rows");

        let (_guard, logs) = capture_warnings();
        let entries = repo.list_price_entries(ACCOUNT).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].price, dec!(150));

        let unreadable = logs.lines_with(&["skipping price entry with unreadable price"]);
        assert_eq!(unreadable.len(), 1, "{unreadable:?}");
        assert!(unreadable[0].contains("entry_id=1"), "{}", unreadable[0]);
        assert!(unreadable[0].contains("Failed to parse 'abc'"), "{}", unreadable[0]);

        let missing = logs.lines_with(&["skipping price entry without a price"]);
        assert_eq!(missing.len(), 1, "{missing:?}");
        assert!(missing[0].contains("entry_id=2"), "{}", missing[0]);

        assert!(logs.lines_with(&["entry_id=3"]).is_empty());
    }

    #[tokio::test]
    async fn test_inverted_rows_are_returned_as_stored() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        sqlx::query(
            "INSERT INTO price_entries
                (account_id, room_id, rate_code, occupancy, start_date, end_date, price)
             VALUES (1, ?, 'BAR', 2, '2025-01-20', '2025-01-10', '90')",
        )
        .bind(room.id.0)
        .execute(repo.pool())
        .await
        .unwrap();

        let entries = repo.list_price_entries(ACCOUNT).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert!(!entries[0].range.is_well_formed());
    }

    #[tokio::test]
    async fn test_delete_price_entry() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        let created = repo
            .create_price_entry(new_entry(room.id, date(1, 1), date(1, 31), dec!(100)))
            .await
            .unwrap();

        repo.delete_price_entry(ACCOUNT, created.id)
            .await
            .expect("Should delete entry");

        assert!(repo.list_price_entries(ACCOUNT).await.unwrap().is_empty());
        assert_eq!(
            repo.delete_price_entry(ACCOUNT, created.id).await,
            Err(RepositoryError::NotFound)
        );
    }

    #[tokio::test]
    async fn test_delete_price_entry_of_other_account_not_found() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        let created = repo
            .create_price_entry(new_entry(room.id, date(1, 1), date(1, 31), dec!(100)))
            .await
            .unwrap();

        let result = repo.delete_price_entry(AccountId(2), created.id).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
        assert_eq!(repo.list_price_entries(ACCOUNT).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_price_entries_for_key() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        let key = RateKey::new(room.id, "BAR", 2);
        for price in [dec!(100), dec!(150)] {
            repo.create_price_entry(new_entry(room.id, date(1, 1), date(1, 31), price))
                .await
                .unwrap();
        }
        let single = NewPriceEntry {
            occupancy: 1,
            ..new_entry(room.id, date(1, 1), date(1, 31), dec!(80))
        };
        repo.create_price_entry(single).await.unwrap();

        let removed = repo
            .replace_price_entries_for_key(
                ACCOUNT,
                &key,
                vec![new_entry(room.id, date(2, 1), date(2, 28), dec!(120.50))],
            )
            .await
            .unwrap();

        assert_eq!(removed, 2);
        let row = repo.list_price_entries_for_key(ACCOUNT, &key).await.unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row[0].range, DateRange::new(date(2, 1), date(2, 28)).unwrap());
        assert_eq!(row[0].price, dec!(120.50));
        assert_eq!(repo.list_price_entries(ACCOUNT).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_previous_entries() {
        let repo = setup_test_db().await;
        let room = insert_test_room(&repo, ACCOUNT, "Double").await;
        let key = RateKey::new(room.id, "BAR", 2);
        for price in [dec!(100), dec!(150)] {
            repo.create_price_entry(new_entry(room.id, date(1, 1), date(1, 31), price))
                .await
                .unwrap();
        }
        sqlx::query(
            "CREATE TRIGGER reject_price BEFORE INSERT ON price_entries
             WHEN NEW.price = '999'
             BEGIN SELECT RAISE(ABORT, 'price rejected'); END",
        )
        .execute(&repo.pool)
        .await
        .unwrap();

        let result = repo
            .replace_price_entries_for_key(
                ACCOUNT,
                &key,
                vec![
                    new_entry(room.id, date(2, 1), date(2, 28), dec!(120)),
                    new_entry(room.id, date(3, 1), date(3, 31), dec!(999)),
                ],
            )
            .await;

        assert!(
            matches!(&result, Err(RepositoryError::Database(msg)) if msg.contains("price rejected")),
            "got {result:?}"
        );
        let prices: Vec<Decimal> = repo
            .list_price_entries_for_key(ACCOUNT, &key)
            .await
            .unwrap()
            .into_iter()
            .map(|entry| entry.price)
            .collect();
        assert_eq!(prices, vec![dec!(100), dec!(150)]);
    }

    // seeds

    #[tokio::test]
    async fn test_run_seeds() {
        let repo = setup_test_db().await;

        let seeds_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("seeds");
        repo.run_seeds(&seeds_dir)
            .await
            .expect("Should run seeds successfully");
        // Seeds are idempotent.
        repo.run_seeds(&seeds_dir)
            .await
            .expect("Should run seeds twice");

        let rooms = repo.list_rooms(ACCOUNT).await.expect("Should list rooms");
        assert_eq!(rooms.len(), 2);

        let plans = repo.list_rate_plans(ACCOUNT).await.expect("Should list plans");
        assert_eq!(plans.len(), 4);
    }

    #[tokio::test]
    async fn test_run_seeds_nonexistent_directory() {
        let repo = setup_test_db().await;

        let result = repo.run_seeds(Path::new("./nonexistent")).await;

        let err = result.expect_err("Should fail for nonexistent directory");
        assert_eq!(
            err.to_string(),
            "Failed to read seeds directory './nonexistent'"
        );
    }

    #[tokio::test]
    async fn test_new_in_memory_creates_usable_pool() {
        let repo = SqliteRepository::new(":memory:")
            .await
            .expect("Should open in-memory database");
        repo.run_migrations().await.expect("Should migrate");

        insert_test_room(&repo, ACCOUNT, "Double").await;

        assert_eq!(repo.list_rooms(ACCOUNT).await.unwrap().len(), 1);
    }
}
