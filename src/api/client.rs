//! reqwest implementation of the analysis service boundary

use crate::api::{extract_detail, Analysis, AnalysisApi, AnalyzeResponse, ChatRequest, ChatResponse};
use crate::config::Config;
use crate::error::ApiError;
use crate::input::file_detector::FileType;
use crate::session::FileHandle;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use std::time::Duration;
use tokio::fs;

/// HTTP client for both endpoints. One `reqwest::Client` is shared.
#[derive(Clone)]
pub struct HttpAnalysisApi {
    client: Client,
    analyze_url: String,
    chat_url: String,
}

impl HttpAnalysisApi {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.api.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            analyze_url: config.analyze_url(),
            chat_url: config.chat_url(),
        })
    }

    async fn file_part(file: &FileHandle) -> Result<Part, ApiError> {
        let bytes = fs::read(file.path()).await.map_err(|source| ApiError::Upload {
            path: file.path().display().to_string(),
            source,
        })?;
        let mime = file
            .extension()
            .map(|ext| FileType::from_extension(&ext))
            .unwrap_or(FileType::Unknown)
            .mime_type();
        let part = Part::bytes(bytes).file_name(file.name.clone()).mime_str(mime)?;
        Ok(part)
    }

    /// Turn a non-2xx response into `ApiError::Status`, keeping any `detail`.
    async fn reject(response: Response) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        warn!("Analysis service returned {}: {}", status, body);
        ApiError::Status {
            status,
            detail: extract_detail(&body),
        }
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisApi {
    async fn analyze(&self, job_description: &str, files: &[FileHandle]) -> Result<Analysis, ApiError> {
        let mut form = Form::new().text("jd", job_description.to_string());
        for file in files {
            form = form.part("resumes", Self::file_part(file).await?);
        }

        info!("Submitting {} resumes to {}", files.len(), self.analyze_url);
        let response = self.client.post(&self.analyze_url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        let body = response.text().await?;
        let parsed: AnalyzeResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Malformed(format!("analyze body: {}", e)))?;
        let analysis = parsed.into_analysis()?;
        debug!(
            "Analyze succeeded: session={} results={}",
            analysis.session_id,
            analysis.results.len()
        );
        Ok(analysis)
    }

    async fn chat(&self, session_id: &str, question: &str) -> Result<String, ApiError> {
        let request = ChatRequest {
            session_id,
            question,
        };

        debug!("Chat request for session {}", session_id);
        let response = self.client.post(&self.chat_url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Malformed(format!("chat body: {}", e)))?;
        parsed.into_answer()
    }
}
