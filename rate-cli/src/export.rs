use std::io::Write;

use chrono::NaiveDate;
use rate_core::calendar::RateCalendar;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// One resolved day of one calendar row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPriceRecord {
    pub room_id: i64,
    pub room: String,
    pub rate_code: String,
    pub occupancy: u32,
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Every (row, day) of the displayed month with its resolved price, in row
/// display order. Days without a price are exported as `0`.
pub fn daily_prices(calendar: &RateCalendar) -> Vec<DailyPriceRecord> {
    calendar
        .rows()
        .into_iter()
        .flat_map(|row| {
            calendar
                .row_cells(&row.key)
                .into_iter()
                .map(move |cell| DailyPriceRecord {
                    room_id: row.key.room_id.0,
                    room: row.room_name.clone(),
                    rate_code: row.key.rate_code.clone(),
                    occupancy: row.key.occupancy,
                    date: cell.day,
                    price: cell.price,
                })
        })
        .collect()
}

/// Writes [`daily_prices`] as CSV with a header line. Returns the number of
/// records written.
pub fn write_csv<W: Write>(
    calendar: &RateCalendar,
    out: W,
) -> Result<usize, csv::Error> {
    let records = daily_prices(calendar);
    let mut writer = csv::Writer::from_writer(out);
    for record in &records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!(month = %calendar.month(), records = records.len(), "exported daily prices");
    Ok(records.len())
}
