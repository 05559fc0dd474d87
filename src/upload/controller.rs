//! Upload controller: validates and submits a job description plus resume batch

use crate::api::{Analysis, AnalysisApi};
use crate::error::{Result, ScreenerError, GENERIC_FAILURE_MESSAGE};
use crate::navigation::{self, NavigationPayload, SessionSnapshot};
use crate::session::{AnalysisSession, FileHandle, Phase};
use crate::upload::notifier::{Notice, NoticeLevel, Notifier};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

pub const REQUIRED_INPUT_WARNING: &str = "JD and Resumes are required!";
pub const ANALYZING_NOTICE: &str = "Analyzing resumes... This may take a moment.";
pub const SUCCESS_NOTICE: &str = "Analysis complete! Redirecting...";
pub const FAILURE_TITLE: &str = "Analysis Failed";

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Local validation failed; nothing was sent.
    Rejected,
    /// Analysis finished; the payload goes to the results screen.
    Ready(NavigationPayload),
    /// The request failed. Input is kept for a retry.
    Failed { message: String },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileSelection {
    pub added: usize,
    pub refused: Vec<String>,
}

pub struct UploadController {
    session: Option<AnalysisSession>,
    api: Arc<dyn AnalysisApi>,
    notifier: Arc<dyn Notifier>,
    accepted_extensions: Vec<String>,
}

impl UploadController {
    pub fn new(
        api: Arc<dyn AnalysisApi>,
        notifier: Arc<dyn Notifier>,
        accepted_extensions: Vec<String>,
    ) -> Self {
        Self {
            session: None,
            api,
            notifier,
            accepted_extensions,
        }
    }

    /// `None` until the user has typed a job description or picked a file.
    pub fn session(&self) -> Option<&AnalysisSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map(|s| s.phase()).unwrap_or(Phase::Empty)
    }

    pub fn pending_files(&self) -> &[FileHandle] {
        self.session.as_ref().map(|s| s.pending_files()).unwrap_or(&[])
    }

    pub fn job_description(&self) -> &str {
        self.session.as_ref().map(|s| s.job_description()).unwrap_or("")
    }

    fn session_mut(&mut self) -> &mut AnalysisSession {
        self.session.get_or_insert_with(AnalysisSession::new)
    }

    pub fn set_job_description(&mut self, text: impl Into<String>) -> Result<()> {
        self.session_mut().set_job_description(text)
    }

    /// Append files in the given order. Files outside the accepted types are
    /// refused with a warning and are not added.
    pub fn add_files(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> Result<FileSelection> {
        let mut selection = FileSelection::default();
        let mut accepted = Vec::new();

        for path in paths {
            let handle = FileHandle::from_path(path);
            let allowed = handle
                .extension()
                .map(|ext| self.accepted_extensions.iter().any(|a| a.eq_ignore_ascii_case(&ext)))
                .unwrap_or(false);
            if allowed {
                accepted.push(handle);
            } else {
                selection.refused.push(handle.name);
            }
        }

        selection.added = accepted.len();
        if !accepted.is_empty() {
            self.session_mut().add_files(accepted)?;
        }

        if !selection.refused.is_empty() {
            self.notifier.notify(
                Notice::new(NoticeLevel::Warning, "Unsupported file type").with_description(format!(
                    "{} (accepted: {})",
                    selection.refused.join(", "),
                    self.accepted_extensions.join(", ")
                )),
            );
        }
        Ok(selection)
    }

    pub fn remove_file(&mut self, index: usize) -> Result<FileHandle> {
        self.session_mut().remove_file(index)
    }

    /// True when [`submit`](Self::submit) would issue a request.
    pub fn can_submit(&self) -> bool {
        match &self.session {
            Some(session) => {
                !session.job_description().trim().is_empty() && !session.pending_files().is_empty()
            }
            None => false,
        }
    }

    pub async fn submit(&mut self) -> AnalysisOutcome {
        if !self.can_submit() {
            self.notifier.notify(Notice::new(NoticeLevel::Warning, REQUIRED_INPUT_WARNING));
            return AnalysisOutcome::Rejected;
        }

        let session = self.session_mut();
        if let Err(e) = session.begin_submit() {
            warn!("Submit refused: {}", e);
            return AnalysisOutcome::Rejected;
        }
        let job_description = session.job_description().trim().to_string();
        let files = session.pending_files().to_vec();

        self.notifier.notify(Notice::new(NoticeLevel::Info, ANALYZING_NOTICE));
        info!("Analyzing {} resumes", files.len());

        match self.api.analyze(&job_description, &files).await {
            Ok(analysis) => {
                debug!("Session {} returned {} results", analysis.session_id, analysis.results.len());
                let handed_off = self.hand_off(analysis);

                match handed_off {
                    Ok(payload) => {
                        self.notifier.notify(Notice::new(NoticeLevel::Success, SUCCESS_NOTICE));
                        AnalysisOutcome::Ready(payload)
                    }
                    Err(e) => {
                        error!("Could not hand off analysed session: {}", e);
                        self.fail(GENERIC_FAILURE_MESSAGE.to_string())
                    }
                }
            }
            Err(e) => {
                error!("Error analyzing resumes: {}", e);
                self.fail(e.user_message())
            }
        }
    }

    fn hand_off(&mut self, analysis: Analysis) -> Result<NavigationPayload> {
        let session = self.session_mut();
        session.complete_submit(analysis.session_id, analysis.results)?;
        let snapshot = SessionSnapshot::from_session(session).ok_or_else(|| {
            ScreenerError::InvalidTransition("ready session produced no snapshot".to_string())
        })?;
        navigation::handoff(&snapshot)
    }

    fn fail(&mut self, message: String) -> AnalysisOutcome {
        if let Err(e) = self.session_mut().fail_submit() {
            warn!("Could not mark session failed: {}", e);
        }
        self.notifier
            .notify(Notice::new(NoticeLevel::Error, FAILURE_TITLE).with_description(message.clone()));
        AnalysisOutcome::Failed { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::navigation::{resolve, ResultsRoute};
    use crate::session::{ResultId, ResumeResult};
    use crate::upload::notifier::RecordingNotifier;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedApi {
        analyze_calls: AtomicUsize,
        seen_jd: Mutex<Option<String>>,
        reply: Mutex<Option<std::result::Result<Analysis, ApiError>>>,
    }

    impl ScriptedApi {
        fn replying(reply: std::result::Result<Analysis, ApiError>) -> Arc<Self> {
            Arc::new(Self {
                analyze_calls: AtomicUsize::new(0),
                seen_jd: Mutex::new(None),
                reply: Mutex::new(Some(reply)),
            })
        }
    }

    #[async_trait]
    impl AnalysisApi for ScriptedApi {
        async fn analyze(&self, job_description: &str, _files: &[FileHandle]) -> std::result::Result<Analysis, ApiError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_jd.lock().unwrap() = Some(job_description.to_string());
            self.reply
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(ApiError::Malformed("no scripted reply".to_string())))
        }

        async fn chat(&self, _session_id: &str, _question: &str) -> std::result::Result<String, ApiError> {
            Err(ApiError::Malformed("chat not scripted".to_string()))
        }
    }

    fn controller(api: Arc<ScriptedApi>) -> (UploadController, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = UploadController::new(
            api,
            notifier.clone(),
            vec!["pdf".to_string(), "doc".to_string(), "docx".to_string()],
        );
        (controller, notifier)
    }

    fn two_results() -> Analysis {
        Analysis {
            session_id: "s1".to_string(),
            results: vec![
                ResumeResult {
                    id: ResultId::Number(1),
                    filename: "a.pdf".to_string(),
                    match_percentage: 91.2,
                    summary: None,
                    strengths: vec![],
                    weaknesses: vec![],
                },
                ResumeResult {
                    id: ResultId::Number(2),
                    filename: "b.docx".to_string(),
                    match_percentage: 77.5,
                    summary: None,
                    strengths: vec![],
                    weaknesses: vec![],
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected_locally() {
        let api = ScriptedApi::replying(Ok(two_results()));
        let (mut controller, notifier) = controller(api.clone());
        controller.set_job_description("   \n\t").unwrap();
        controller.add_files(vec![PathBuf::from("a.pdf")]).unwrap();

        assert_eq!(controller.submit().await, AnalysisOutcome::Rejected);
        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.phase(), Phase::Empty);
        assert_eq!(notifier.last().unwrap().title, REQUIRED_INPUT_WARNING);
    }

    #[tokio::test]
    async fn test_no_files_is_rejected_locally() {
        let api = ScriptedApi::replying(Ok(two_results()));
        let (mut controller, _) = controller(api.clone());
        controller.set_job_description("Senior backend engineer").unwrap();

        assert_eq!(controller.submit().await, AnalysisOutcome::Rejected);
        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_untouched_controller_has_no_session() {
        let api = ScriptedApi::replying(Ok(two_results()));
        let (mut controller, _) = controller(api.clone());
        assert!(controller.session().is_none());
        assert_eq!(controller.submit().await, AnalysisOutcome::Rejected);
        assert!(controller.session().is_none());
    }

    #[tokio::test]
    async fn test_successful_submit_sends_trimmed_jd_and_hands_off() {
        let api = ScriptedApi::replying(Ok(two_results()));
        let (mut controller, notifier) = controller(api.clone());
        controller.set_job_description("  Senior backend engineer \n").unwrap();
        controller
            .add_files(vec![PathBuf::from("a.pdf"), PathBuf::from("b.docx")])
            .unwrap();

        let outcome = controller.submit().await;
        assert_eq!(api.analyze_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.seen_jd.lock().unwrap().as_deref(), Some("Senior backend engineer"));
        assert_eq!(controller.phase(), Phase::Ready);

        let payload = match outcome {
            AnalysisOutcome::Ready(payload) => payload,
            other => panic!("expected ready outcome, got {:?}", other),
        };
        match resolve(Some(&payload)) {
            ResultsRoute::Render(snapshot) => {
                assert_eq!(snapshot.session_id, "s1");
                assert_eq!(snapshot.results, two_results().results);
            }
            ResultsRoute::RedirectToStart => panic!("payload should render"),
        }

        let levels: Vec<NoticeLevel> = notifier.notices().iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![NoticeLevel::Info, NoticeLevel::Success]);
    }

    #[tokio::test]
    async fn test_server_failure_keeps_input_and_shows_detail() {
        let api = ScriptedApi::replying(Err(ApiError::Status {
            status: 500,
            detail: Some("engine unavailable".to_string()),
        }));
        let (mut controller, notifier) = controller(api);
        controller.set_job_description("Senior backend engineer").unwrap();
        controller
            .add_files(vec![PathBuf::from("a.pdf"), PathBuf::from("b.docx")])
            .unwrap();

        let outcome = controller.submit().await;
        assert_eq!(
            outcome,
            AnalysisOutcome::Failed {
                message: "engine unavailable".to_string()
            }
        );
        assert_eq!(controller.phase(), Phase::Failed);
        assert_eq!(notifier.last().unwrap().text(), "engine unavailable");

        let names: Vec<&str> = controller.pending_files().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.pdf", "b.docx"]);
        assert_eq!(controller.job_description(), "Senior backend engineer");
    }

    #[tokio::test]
    async fn test_malformed_response_uses_generic_message() {
        let api = ScriptedApi::replying(Err(ApiError::Malformed("no sessionId".to_string())));
        let (mut controller, notifier) = controller(api);
        controller.set_job_description("QA lead").unwrap();
        controller.add_files(vec![PathBuf::from("a.pdf")]).unwrap();

        controller.submit().await;
        assert_eq!(notifier.last().unwrap().text(), GENERIC_FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn test_unsupported_files_are_refused() {
        let api = ScriptedApi::replying(Ok(two_results()));
        let (mut controller, notifier) = controller(api);
        let selection = controller
            .add_files(vec![
                PathBuf::from("a.PDF"),
                PathBuf::from("notes.txt"),
                PathBuf::from("c.docx"),
                PathBuf::from("README"),
            ])
            .unwrap();

        assert_eq!(selection.added, 2);
        assert_eq!(selection.refused, vec!["notes.txt", "README"]);
        assert_eq!(notifier.last().unwrap().level, NoticeLevel::Warning);
        assert_eq!(controller.pending_files().len(), 2);
    }
}
