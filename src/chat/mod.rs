//! Follow-up chat scoped to one analysed batch

pub mod controller;

pub use controller::{AskOutcome, BeginAsk, ChatController, PendingAsk, CHAT_FALLBACK_MESSAGE, CHAT_READY_MESSAGE};
