//! Price resolution for the rate calendar.

pub mod resolver;

pub use resolver::{PriceResolver, resolve_price};
