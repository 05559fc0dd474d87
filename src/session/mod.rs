//! Session model
//! The analysis session entity and its lifecycle transitions

pub mod model;

pub use model::{AnalysisSession, ChatTurn, FileHandle, Phase, ResultId, ResumeResult, Sender};
