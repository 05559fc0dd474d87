//! Error handling for the resume screener

use thiserror::Error;

/// Generic message shown when the analysis service gives no detail of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "An unknown error occurred.";

#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid session transition: {0}")]
    InvalidTransition(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Analysis service error: {0}")]
    Api(#[from] ApiError),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

/// Failures talking to the remote analysis service.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned status {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("could not read upload {path}: {source}")]
    Upload {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// The text a user should see for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScreenerError>;
