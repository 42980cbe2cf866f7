//! Month rate calendar: one row per room × rate plan × occupancy, one cell
//! per day.
//!
//! [`RateCalendar`] is the store of a single calendar view. It owns the entry
//! snapshot fetched for the account and the view's [`SelectionMachine`];
//! nothing here is shared between views.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::YearMonth;
use crate::pricing::PriceResolver;
use crate::selection::{CompletedSelection, PriceDraft, SelectionEvent, SelectionMachine, SelectionState};
use crate::{AccountId, PriceEntry, RateKey, RatePlan, Room};

/// Header of one calendar row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRow {
    pub key: RateKey,
    pub room_name: String,
    pub rate_plan_name: String,
}

/// One day of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateCell {
    pub day: NaiveDate,
    /// Resolved price; zero when no entry covers the day.
    pub price: Decimal,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct RateCalendar {
    account_id: AccountId,
    month: YearMonth,
    rooms: Vec<Room>,
    rate_plans: Vec<RatePlan>,
    entries: Vec<PriceEntry>,
    selection: SelectionMachine,
}

impl RateCalendar {
    pub fn new(
        account_id: AccountId,
        month: YearMonth,
        rooms: Vec<Room>,
        rate_plans: Vec<RatePlan>,
        entries: Vec<PriceEntry>,
    ) -> Self {
        Self {
            account_id,
            month,
            rooms,
            rate_plans,
            entries,
            selection: SelectionMachine::new(),
        }
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    /// Swaps in a freshly fetched entry snapshot.
    pub fn replace_entries(
        &mut self,
        entries: Vec<PriceEntry>,
    ) {
        debug!(count = entries.len(), "replacing price entry snapshot");
        self.entries = entries;
    }

    /// Rows in display order: rooms by name, plans by code, occupancy
    /// ascending from 1 to the room's maximum.
    pub fn rows(&self) -> Vec<RateRow> {
        let mut rooms: Vec<&Room> = self.rooms.iter().collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let mut rows = Vec::new();
        for room in rooms {
            if room.max_occupancy == 0 {
                warn!(room_id = %room.id, room = %room.name, "room has no bookable occupancy");
                continue;
            }

            let mut plans: Vec<&RatePlan> = self
                .rate_plans
                .iter()
                .filter(|plan| plan.room_id == room.id)
                .collect();
            plans.sort_by(|a, b| a.code.cmp(&b.code));

            for plan in plans {
                for occupancy in 1..=room.max_occupancy {
                    rows.push(RateRow {
                        key: RateKey::new(room.id, plan.code.clone(), occupancy),
                        room_name: room.name.clone(),
                        rate_plan_name: plan.name.clone(),
                    });
                }
            }
        }
        rows
    }

    /// Entries of the snapshot that belong to `key`, in snapshot order.
    pub fn entries_for<'a>(
        &'a self,
        key: &'a RateKey,
    ) -> impl Iterator<Item = &'a PriceEntry> + 'a {
        self.entries.iter().filter(move |entry| entry.matches_key(key))
    }

    /// Every day of the displayed month for one row.
    pub fn row_cells(
        &self,
        key: &RateKey,
    ) -> Vec<RateCell> {
        let resolver = PriceResolver::from_entries(self.entries_for(key));
        self.month
            .days()
            .map(|day| RateCell {
                day,
                price: resolver.resolve(day),
                selected: self.selection.is_selected(key, day),
            })
            .collect()
    }

    pub fn price_on(
        &self,
        key: &RateKey,
        day: NaiveDate,
    ) -> Decimal {
        PriceResolver::from_entries(self.entries_for(key)).resolve(day)
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn click(
        &mut self,
        key: &RateKey,
        day: NaiveDate,
    ) -> Option<SelectionEvent> {
        self.selection.click(key, day)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn take_completed(&mut self) -> Option<CompletedSelection> {
        self.selection.take_completed()
    }

    /// Consumes a completed selection and opens the creation form for it.
    pub fn open_draft(&mut self) -> Option<PriceDraft> {
        self.take_completed()
            .map(|selection| PriceDraft::from_selection(self.account_id, selection))
    }

    /// Moves to the next month. Any selection in progress is dropped.
    ///
    /// Returns `false` (and stays put) at the end of the calendar range.
    pub fn next_month(&mut self) -> bool {
        self.shift_month(1)
    }

    pub fn previous_month(&mut self) -> bool {
        self.shift_month(-1)
    }

    fn shift_month(
        &mut self,
        delta: i32,
    ) -> bool {
        match self.month.add_months(delta) {
            Some(month) => {
                self.month = month;
                self.selection.clear();
                true
            }
            None => false,
        }
    }
}
