//! Resume screener library

pub mod api;
pub mod app;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod navigation;
pub mod output;
pub mod results;
pub mod session;
pub mod upload;

pub use config::Config;
pub use error::{ApiError, Result, ScreenerError};
