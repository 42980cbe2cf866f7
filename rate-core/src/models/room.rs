use serde::{Deserialize, Serialize};

use super::{AccountId, RoomId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub account_id: AccountId,
    pub name: String,
    /// Highest guest count the room can be priced for.
    /// The rate calendar shows one row per occupancy from 1 up to this value.
    pub max_occupancy: u32,
}

/// For creating new rooms (no id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRoom {
    pub account_id: AccountId,
    pub name: String,
    pub max_occupancy: u32,
}
