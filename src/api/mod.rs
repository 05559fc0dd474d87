//! Boundary to the remote analysis service
//!
//! Every call to the Analyze and Chat endpoints goes through [`AnalysisApi`].
//! The HTTP implementation lives in [`client`]; tests swap in scripted fakes.

use crate::error::ApiError;
use crate::session::{FileHandle, ResumeResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::HttpAnalysisApi;

/// A validated Analyze response.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub session_id: String,
    pub results: Vec<ResumeResult>,
}

#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// One multipart submission of the trimmed job description and every file.
    async fn analyze(&self, job_description: &str, files: &[FileHandle]) -> Result<Analysis, ApiError>;

    /// One question against an analysed batch; returns the answer text.
    async fn chat(&self, session_id: &str, question: &str) -> Result<String, ApiError>;
}

/// Raw Analyze body. Both fields are required; see [`AnalyzeResponse::into_analysis`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub session_id: Option<String>,
    pub results: Option<Vec<ResumeResult>>,
}

impl AnalyzeResponse {
    /// A body missing either field is malformed; partial success is not inferred.
    pub fn into_analysis(self) -> Result<Analysis, ApiError> {
        let session_id = match self.session_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(ApiError::Malformed("response has no sessionId".to_string())),
        };
        let results = self
            .results
            .ok_or_else(|| ApiError::Malformed("response has no results".to_string()))?;
        Ok(Analysis { session_id, results })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest<'a> {
    pub session_id: &'a str,
    pub question: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub answer: Option<String>,
}

impl ChatResponse {
    pub fn into_answer(self) -> Result<String, ApiError> {
        self.answer
            .ok_or_else(|| ApiError::Malformed("response has no answer".to_string()))
    }
}

/// Error body shape used by the service on non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<serde_json::Value>,
}

/// Pull a usable `detail` string out of an error body, if there is one.
pub fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(detail) if !detail.trim().is_empty() => Some(detail),
        _ => None,
    }
}
