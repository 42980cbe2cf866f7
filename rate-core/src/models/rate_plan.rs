use serde::{Deserialize, Serialize};

use super::{AccountId, RoomId};

/// Board basis included in a rate plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealPlan {
    RoomOnly,
    Breakfast,
    HalfBoard,
    FullBoard,
    AllInclusive,
}

impl MealPlan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RoomOnly => "RO",
            Self::Breakfast => "BB",
            Self::HalfBoard => "HB",
            Self::FullBoard => "FB",
            Self::AllInclusive => "AI",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "RO" => Some(Self::RoomOnly),
            "BB" => Some(Self::Breakfast),
            "HB" => Some(Self::HalfBoard),
            "FB" => Some(Self::FullBoard),
            "AI" => Some(Self::AllInclusive),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RoomOnly => "Room only",
            Self::Breakfast => "Bed & breakfast",
            Self::HalfBoard => "Half board",
            Self::FullBoard => "Full board",
            Self::AllInclusive => "All inclusive",
        }
    }
}

/// A named pricing policy attached to one room.
///
/// `code` is the short identifier prices are tagged with (e.g. `"BAR"`,
/// `"NRF-BB"`); it is unique per room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePlan {
    pub id: i64,
    pub account_id: AccountId,
    pub room_id: RoomId,
    pub code: String,
    pub name: String,
    pub meal_plan: MealPlan,
    /// `false` for non-refundable plans.
    pub refundable: bool,
}

/// For creating new rate plans (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRatePlan {
    pub account_id: AccountId,
    pub room_id: RoomId,
    pub code: String,
    pub name: String,
    pub meal_plan: MealPlan,
    pub refundable: bool,
}
