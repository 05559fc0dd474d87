//! In-memory model of one analysis session

use crate::error::{Result, ScreenerError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Coarse lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Empty,
    Submitting,
    Ready,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Empty => "empty",
            Phase::Submitting => "submitting",
            Phase::Ready => "ready",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A resume file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub path: PathBuf,
    pub name: String,
}

impl FileHandle {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}

/// Result ids come back as strings or numbers depending on the engine build.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultId::Number(n) => write!(f, "{}", n),
            ResultId::Text(s) => f.write_str(s),
        }
    }
}

/// One resume's scored assessment, as returned by the analysis engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeResult {
    pub id: ResultId,
    pub filename: String,
    #[serde(default, deserialize_with = "lenient_score")]
    pub match_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub strengths: Vec<String>,
    #[serde(default, deserialize_with = "lenient_text_list")]
    pub weaknesses: Vec<String>,
}

/// Accepts a number or a numeric string; anything else reads as 0.
fn lenient_score<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let score = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(score.unwrap_or(0.0))
}

/// Accepts a list of strings; `null` or any non-list value reads as empty.
fn lenient_text_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let items = match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(items)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message in the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            sent_at: Utc::now(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            sent_at: Utc::now(),
        }
    }
}

/// A job description plus resume batch, from first input through chat.
///
/// `ranked_results` and `session_id` are only populated in [`Phase::Ready`];
/// every transition below preserves that.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    session_id: Option<String>,
    job_description: String,
    pending_files: Vec<FileHandle>,
    ranked_results: Vec<ResumeResult>,
    chat_transcript: Vec<ChatTurn>,
    phase: Phase,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            session_id: None,
            job_description: String::new(),
            pending_files: Vec::new(),
            ranked_results: Vec::new(),
            chat_transcript: Vec::new(),
            phase: Phase::Empty,
        }
    }

    /// Rebuild a ready session on the results side of a navigation handoff.
    pub fn ready(session_id: String, job_description: String, results: Vec<ResumeResult>) -> Self {
        Self {
            session_id: Some(session_id),
            job_description,
            pending_files: Vec::new(),
            ranked_results: results,
            chat_transcript: Vec::new(),
            phase: Phase::Ready,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn pending_files(&self) -> &[FileHandle] {
        &self.pending_files
    }

    pub fn ranked_results(&self) -> &[ResumeResult] {
        &self.ranked_results
    }

    pub fn chat_transcript(&self) -> &[ChatTurn] {
        &self.chat_transcript
    }

    fn ensure_editable(&self, what: &str) -> Result<()> {
        match self.phase {
            Phase::Empty | Phase::Failed => Ok(()),
            phase => Err(ScreenerError::InvalidTransition(format!(
                "cannot change {} while session is {}",
                what, phase
            ))),
        }
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) -> Result<()> {
        self.ensure_editable("job description")?;
        self.job_description = text.into();
        Ok(())
    }

    /// Appends in selection order. Duplicates are kept.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = FileHandle>) -> Result<()> {
        self.ensure_editable("file selection")?;
        self.pending_files.extend(files);
        Ok(())
    }

    /// Removes exactly the entry at `index`, keeping the others in order.
    pub fn remove_file(&mut self, index: usize) -> Result<FileHandle> {
        self.ensure_editable("file selection")?;
        if index >= self.pending_files.len() {
            return Err(ScreenerError::InvalidInput(format!(
                "no selected file at position {}",
                index + 1
            )));
        }
        Ok(self.pending_files.remove(index))
    }

    pub fn begin_submit(&mut self) -> Result<()> {
        match self.phase {
            Phase::Empty | Phase::Failed => {
                self.phase = Phase::Submitting;
                Ok(())
            }
            phase => Err(ScreenerError::InvalidTransition(format!(
                "cannot submit a session that is {}",
                phase
            ))),
        }
    }

    /// Store the engine's answer verbatim; result order is never changed here.
    pub fn complete_submit(&mut self, session_id: String, results: Vec<ResumeResult>) -> Result<()> {
        if self.phase != Phase::Submitting {
            return Err(ScreenerError::InvalidTransition(format!(
                "cannot complete a session that is {}",
                self.phase
            )));
        }
        if session_id.is_empty() {
            return Err(ScreenerError::InvalidTransition(
                "a ready session needs a session id".to_string(),
            ));
        }
        self.session_id = Some(session_id);
        self.ranked_results = results;
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Job description and file list survive so the user can resubmit.
    pub fn fail_submit(&mut self) -> Result<()> {
        if self.phase != Phase::Submitting {
            return Err(ScreenerError::InvalidTransition(format!(
                "cannot fail a session that is {}",
                self.phase
            )));
        }
        self.phase = Phase::Failed;
        Ok(())
    }

    pub fn append_turn(&mut self, turn: ChatTurn) -> Result<()> {
        if self.phase != Phase::Ready || self.session_id.is_none() {
            return Err(ScreenerError::InvalidTransition(format!(
                "chat is unavailable while session is {}",
                self.phase
            )));
        }
        self.chat_transcript.push(turn);
        Ok(())
    }
}
