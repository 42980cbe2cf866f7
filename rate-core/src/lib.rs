pub mod calendar;
pub mod db;
pub mod models;
pub mod pricing;
pub mod selection;

pub use db::repository::{RateRepository, RepositoryError};
pub use models::*;
