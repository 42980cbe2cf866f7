//! Two-click date-range selection on the rate calendar.
//!
//! The first click on a row anchors a selection on that row's [`RateKey`].
//! A second click on the same row, on or after the anchor, completes the
//! range and produces [`SelectionEvent::Completed`] (the caller opens the
//! price creation form). A second click before the anchor abandons the
//! selection. Clicking another row at any point re-anchors on that row.
//!
//! | State           | Click                         | Next state      | Event       |
//! |-----------------|-------------------------------|-----------------|-------------|
//! | `Idle`          | any `(key, d)`                | `AnchorSet`     |             |
//! | `AnchorSet`     | other key                     | `AnchorSet`     |             |
//! | `AnchorSet`     | same key, `d >= anchor`       | `RangeComplete` | `Completed` |
//! | `AnchorSet`     | same key, `d < anchor`        | `Idle`          | `Abandoned` |
//! | `RangeComplete` | any `(key, d)`                | `AnchorSet`     |             |
//!
//! [`transition`] is the pure step function; [`SelectionMachine`] owns one
//! state per calendar view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::RateKey;
use crate::calendar::DateRange;

/// Current selection of one calendar view.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    /// First click recorded; start and end are both the anchor day.
    AnchorSet { key: RateKey, anchor: NaiveDate },
    /// Both ends set and the completion event has fired. Waits to be consumed
    /// by [`SelectionMachine::take_completed`] or reset.
    RangeComplete { key: RateKey, range: DateRange },
}

impl SelectionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn key(&self) -> Option<&RateKey> {
        match self {
            Self::Idle => None,
            Self::AnchorSet { key, .. } | Self::RangeComplete { key, .. } => Some(key),
        }
    }

    /// Selected span; a single day while only the anchor is set.
    pub fn range(&self) -> Option<DateRange> {
        match self {
            Self::Idle => None,
            Self::AnchorSet { anchor, .. } => Some(DateRange::single_day(*anchor)),
            Self::RangeComplete { range, .. } => Some(*range),
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.range().map(|r| r.start())
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.range().map(|r| r.end())
    }
}

/// A finished selection, ready to pre-fill the price creation form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSelection {
    pub key: RateKey,
    pub range: DateRange,
}

/// Side effects a click can request from the surrounding view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    /// Open the creation form for this selection.
    Completed(CompletedSelection),
    /// The second click landed before the anchor; the selection was dropped.
    Abandoned,
}

/// Next state and event for a click on `day` in the row identified by `key`.
pub fn transition(
    state: &SelectionState,
    key: &RateKey,
    day: NaiveDate,
) -> (SelectionState, Option<SelectionEvent>) {
    let anchored = || SelectionState::AnchorSet {
        key: key.clone(),
        anchor: day,
    };

    match state {
        SelectionState::AnchorSet {
            key: anchored_key,
            anchor,
        } if anchored_key == key => match DateRange::new(*anchor, day) {
            Ok(range) => {
                let completed = CompletedSelection {
                    key: key.clone(),
                    range,
                };
                (
                    SelectionState::RangeComplete {
                        key: key.clone(),
                        range,
                    },
                    Some(SelectionEvent::Completed(completed)),
                )
            }
            Err(_) => (SelectionState::Idle, Some(SelectionEvent::Abandoned)),
        },
        SelectionState::Idle
        | SelectionState::AnchorSet { .. }
        | SelectionState::RangeComplete { .. } => (anchored(), None),
    }
}

/// Selection store owned by a single calendar view.
#[derive(Debug, Clone, Default)]
pub struct SelectionMachine {
    state: SelectionState,
}

impl SelectionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// Feeds a cell click; returns the event the view must act on, if any.
    pub fn click(
        &mut self,
        key: &RateKey,
        day: NaiveDate,
    ) -> Option<SelectionEvent> {
        let (next, event) = transition(&self.state, key, day);
        debug!(%key, %day, from = ?self.state, to = ?next, "selection click");
        self.state = next;
        event
    }

    /// Forces `Idle` from any state.
    pub fn clear(&mut self) {
        self.state = SelectionState::Idle;
    }

    /// Consumes a completed selection and resets to `Idle`.
    ///
    /// Leaves any other state untouched and returns `None`.
    pub fn take_completed(&mut self) -> Option<CompletedSelection> {
        match std::mem::take(&mut self.state) {
            SelectionState::RangeComplete { key, range } => Some(CompletedSelection { key, range }),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Whether the cell `(key, day)` should be highlighted.
    pub fn is_selected(
        &self,
        key: &RateKey,
        day: NaiveDate,
    ) -> bool {
        self.state.key() == Some(key)
            && self
                .state
                .range()
                .is_some_and(|range| range.contains(day))
    }
}
