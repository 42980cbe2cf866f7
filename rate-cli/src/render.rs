//! Plain-text rendering of a [`RateCalendar`] month.
//!
//! A month row has one price per day; consecutive days with the same price
//! are collapsed into a [`PriceRun`] so a row fits on a few lines.

use std::io::{self, Write};

use chrono::NaiveDate;
use rate_core::PriceEntry;
use rate_core::calendar::{RateCalendar, RateCell};
use rust_decimal::Decimal;

const COLUMN_GAP: &str = "   ";

/// Consecutive days of one row sharing a price and selection state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRun {
    pub first: NaiveDate,
    pub last: NaiveDate,
    pub price: Decimal,
    pub selected: bool,
}

impl PriceRun {
    pub fn days_label(&self) -> String {
        if self.first == self.last {
            self.first.format("%b %d").to_string()
        } else {
            format!("{} - {}", self.first.format("%b %d"), self.last.format("%b %d"))
        }
    }
}

/// Collapses day cells (in day order) into runs.
pub fn price_runs(cells: &[RateCell]) -> Vec<PriceRun> {
    let mut runs: Vec<PriceRun> = Vec::new();
    for cell in cells {
        match runs.last_mut() {
            Some(run)
                if run.price == cell.price
                    && run.selected == cell.selected
                    && run.last.succ_opt() == Some(cell.day) =>
            {
                run.last = cell.day;
            }
            _ => runs.push(PriceRun {
                first: cell.day,
                last: cell.day,
                price: cell.price,
                selected: cell.selected,
            }),
        }
    }
    runs
}

/// `-` for days without a price.
pub fn format_price(price: Decimal) -> String {
    if price.is_zero() {
        "-".to_string()
    } else {
        format!("{:.2}", price)
    }
}

/// Writes the month grid followed by the stored entries touching the month.
pub fn render_calendar<W: Write + ?Sized>(
    calendar: &RateCalendar,
    out: &mut W,
) -> io::Result<()> {
    let month = calendar.month();
    let title = format!(
        "Rates for {} (account {})",
        month.first_day().format("%B %Y"),
        calendar.account_id()
    );

    let rows = calendar.rows();
    if rows.is_empty() {
        return write_table(
            out,
            &title,
            &[],
            &[],
            Some("No rooms with rate plans for this account."),
        );
    }

    let mut lines: Vec<Vec<String>> = Vec::new();
    for row in &rows {
        let cells = calendar.row_cells(&row.key);
        for (i, run) in price_runs(&cells).iter().enumerate() {
            let (room, plan, guests) = if i == 0 {
                (
                    row.room_name.clone(),
                    format!("{} ({})", row.key.rate_code, row.rate_plan_name),
                    row.key.occupancy.to_string(),
                )
            } else {
                (String::new(), String::new(), String::new())
            };
            let marker = if run.selected { "*" } else { "" };
            lines.push(vec![
                room,
                plan,
                guests,
                format!("{}{}", run.days_label(), marker),
                format_price(run.price),
            ]);
        }
    }
    write_table(
        out,
        &title,
        &["Room", "Rate plan", "Guests", "Days", "Price"],
        &lines,
        None,
    )?;
    writeln!(out)?;

    let first = month.first_day();
    let last = month.last_day();
    let touching: Vec<&PriceEntry> = calendar
        .entries()
        .iter()
        .filter(|entry| entry.range.start() <= last && entry.range.end() >= first)
        .collect();
    let entry_lines: Vec<Vec<String>> = touching
        .iter()
        .map(|entry| {
            vec![
                entry.id.to_string(),
                entry.key().to_string(),
                entry.range.to_string(),
                format_price(entry.price),
                entry.defect().map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    write_table(
        out,
        "Stored prices",
        &["Id", "Row", "Dates", "Price", "Note"],
        &entry_lines,
        Some("No stored prices touch this month."),
    )
}

fn write_table<W: Write + ?Sized>(
    out: &mut W,
    title: &str,
    headers: &[&str],
    rows: &[Vec<String>],
    empty_message: Option<&str>,
) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    let natural = widths.iter().sum::<usize>() + widths.len().saturating_sub(1) * COLUMN_GAP.len();
    let width = natural
        .max(title.chars().count())
        .max(empty_message.map_or(0, |m| m.chars().count()));
    let separator = "-".repeat(width);

    writeln!(out, "{separator}")?;
    writeln!(out, "{title}")?;
    writeln!(out, "{separator}")?;

    if rows.is_empty() {
        if let Some(message) = empty_message {
            writeln!(out, "{message}")?;
            return writeln!(out, "{separator}");
        }
    }

    if !headers.is_empty() {
        writeln!(out, "{}", join_padded(headers, &widths))?;
        writeln!(out, "{separator}")?;
    }
    for row in rows {
        writeln!(out, "{}", join_padded(row, &widths))?;
    }
    Ok(())
}

fn join_padded<T: AsRef<str>>(
    cells: &[T],
    widths: &[usize],
) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}
