//! Results screen
//! Ranked-entry view model; rendering to text lives in `output`

pub mod presenter;

pub use presenter::{display_percentage, progress_fraction, EntryDetails, EntryView, ResultsPresenter};
