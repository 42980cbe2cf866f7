use rate_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get an optional decimal value from a row, returning None for NULL values.
///
/// Prices are written as TEXT, but INTEGER and REAL values entered by hand
/// are read as well.
pub fn get_optional_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }

    let type_name = value_ref.type_info().name().to_string();

    match type_name.as_str() {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            val.trim().parse::<Decimal>().map(Some).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to parse '{}' in '{}' as Decimal: {}",
                    val, column, e
                ))
            })
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Some(Decimal::from(val)))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map(Some).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Canonical TEXT form used when storing a decimal.
pub fn decimal_to_text(d: Decimal) -> String {
    d.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                value
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch_value(insert: &str) -> sqlx::sqlite::SqliteRow {
        let pool = setup_test_db().await;
        sqlx::query(&format!("INSERT INTO test_decimals (id, value) VALUES (1, {insert})"))
            .execute(&pool)
            .await
            .expect("Failed to insert test data");
        sqlx::query("SELECT value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row")
    }

    // get_optional_decimal tests

    #[tokio::test]
    async fn test_get_decimal_from_text() {
        let row = fetch_value("'150.25'").await;

        assert_eq!(get_optional_decimal(&row, "value"), Ok(Some(dec!(150.25))));
    }

    #[tokio::test]
    async fn test_get_decimal_from_text_with_whitespace() {
        let row = fetch_value("' 99 '").await;

        assert_eq!(get_optional_decimal(&row, "value"), Ok(Some(dec!(99))));
    }

    #[tokio::test]
    async fn test_get_decimal_from_integer() {
        let row = fetch_value("120").await;

        assert_eq!(get_optional_decimal(&row, "value"), Ok(Some(dec!(120))));
    }

    #[tokio::test]
    async fn test_get_decimal_from_real() {
        let row = fetch_value("123.45").await;

        assert_eq!(get_optional_decimal(&row, "value"), Ok(Some(dec!(123.45))));
    }

    #[tokio::test]
    async fn test_get_optional_decimal_null() {
        let row = fetch_value("NULL").await;

        assert_eq!(get_optional_decimal(&row, "value"), Ok(None));
    }

    #[tokio::test]
    async fn test_get_decimal_from_non_numeric_text() {
        let row = fetch_value("'abc'").await;

        let result = get_optional_decimal(&row, "value");

        assert!(
            matches!(&result, Err(RepositoryError::Database(msg)) if msg.starts_with("Failed to parse 'abc' in 'value'")),
            "unexpected result: {result:?}"
        );
    }

    #[tokio::test]
    async fn test_get_decimal_missing_column() {
        let row = fetch_value("1").await;

        assert!(matches!(
            get_optional_decimal(&row, "nope"),
            Err(RepositoryError::Database(_))
        ));
    }

    // decimal_to_text tests

    #[test]
    fn test_decimal_to_text_drops_trailing_zeros() {
        assert_eq!(decimal_to_text(dec!(150.00)), "150");
        assert_eq!(decimal_to_text(dec!(99.50)), "99.5");
    }

    #[test]
    fn test_decimal_to_text_zero() {
        assert_eq!(decimal_to_text(Decimal::ZERO), "0");
    }
}
