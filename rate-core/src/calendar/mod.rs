//! Calendar primitives and the rate-calendar view model.

pub mod date_range;
pub mod grid;
pub mod month;

pub use date_range::{DateRange, DateRangeError, Days, Inclusivity, is_between};
pub use grid::{RateCalendar, RateCell, RateRow};
pub use month::{YearMonth, YearMonthError, add_months, subtract_months};
