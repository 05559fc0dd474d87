//! Upload flow
//! Job description and resume selection, validation, and the Analyze call

pub mod controller;
pub mod notifier;

pub use controller::{AnalysisOutcome, FileSelection, UploadController};
pub use notifier::{Notice, NoticeLevel, Notifier, RecordingNotifier, TerminalNotifier};
