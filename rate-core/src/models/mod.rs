mod ids;
mod price_entry;
mod rate_plan;
mod room;

pub use ids::{AccountId, RoomId};
pub use price_entry::{NewPriceEntry, PriceEntry, PriceEntryDefect, RateKey};
pub use rate_plan::{MealPlan, NewRatePlan, RatePlan};
pub use room::{NewRoom, Room};
