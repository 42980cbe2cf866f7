//! Date-range selection for creating price entries.

pub mod draft;
pub mod machine;

pub use draft::{PriceDraft, PriceDraftError};
pub use machine::{
    CompletedSelection, SelectionEvent, SelectionMachine, SelectionState, transition,
};
