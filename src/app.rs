//! Interactive screens: upload, then results with chat
//!
//! Each screen runs until it yields a [`Route`]. The results screen only ever
//! sees the navigation payload, never the upload screen's session.

use crate::api::AnalysisApi;
use crate::chat::{AskOutcome, BeginAsk, ChatController};
use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::navigation::{self, NavigationPayload, ResultsRoute, Route, SessionSnapshot};
use crate::output::{ReportGenerator, ResultsReport};
use crate::results::ResultsPresenter;
use crate::upload::{AnalysisOutcome, Notice, NoticeLevel, Notifier, UploadController};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadCommand {
    JobDescription(String),
    JobDescriptionFile(PathBuf),
    Add(Vec<PathBuf>),
    Remove(usize),
    Files,
    Submit,
    Help,
    Quit,
    Unknown(String),
}

impl UploadCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (head, rest) = split_command(line);
        let command = match head {
            "/jd" => UploadCommand::JobDescription(rest.to_string()),
            "/jd-file" if !rest.is_empty() => UploadCommand::JobDescriptionFile(PathBuf::from(rest)),
            "/add" if !rest.is_empty() => {
                UploadCommand::Add(rest.split_whitespace().map(PathBuf::from).collect())
            }
            "/remove" => match parse_position(rest) {
                Some(index) => UploadCommand::Remove(index),
                None => UploadCommand::Unknown(line.to_string()),
            },
            "/files" => UploadCommand::Files,
            "/submit" => UploadCommand::Submit,
            "/help" => UploadCommand::Help,
            "/quit" | "/exit" => UploadCommand::Quit,
            _ => UploadCommand::Unknown(line.to_string()),
        };
        Some(command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsCommand {
    List,
    Toggle(usize),
    ExpandAll,
    CollapseAll,
    New,
    Help,
    Quit,
    Ask(String),
    Unknown(String),
}

impl ResultsCommand {
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if !trimmed.starts_with('/') {
            return Some(ResultsCommand::Ask(line.trim_end_matches(['\r', '\n']).to_string()));
        }
        let (head, rest) = split_command(trimmed);
        let command = match head {
            "/list" => ResultsCommand::List,
            "/toggle" => match parse_position(rest) {
                Some(index) => ResultsCommand::Toggle(index),
                None => ResultsCommand::Unknown(trimmed.to_string()),
            },
            "/expand-all" => ResultsCommand::ExpandAll,
            "/collapse-all" => ResultsCommand::CollapseAll,
            "/new" => ResultsCommand::New,
            "/help" => ResultsCommand::Help,
            "/quit" | "/exit" => ResultsCommand::Quit,
            _ => ResultsCommand::Unknown(trimmed.to_string()),
        };
        Some(command)
    }
}

fn split_command(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

/// 1-based position from the user to a 0-based index.
fn parse_position(text: &str) -> Option<usize> {
    text.parse::<usize>().ok().filter(|n| *n > 0).map(|n| n - 1)
}

const UPLOAD_HELP: &str = "\
/jd <text>        set the job description
/jd-file <path>   load the job description from a .txt or .md file
/add <paths...>   select resumes (pdf, doc, docx)
/remove <n>       drop the n-th selected file
/files            show the current selection
/submit           analyze the batch
/quit             leave";

const RESULTS_HELP: &str = "\
/list             show the ranked resumes
/toggle <n>       expand or collapse entry n
/expand-all       expand every entry
/collapse-all     collapse every entry
/new              start a new analysis
/quit             leave
anything else is sent as a question about the batch";

/// The results screen: ranked list plus chat, built from a navigation payload.
pub struct ResultsScreen {
    presenter: ResultsPresenter,
    chat: ChatController,
}

impl ResultsScreen {
    /// `None` means there is no usable session and the caller must go back to start.
    pub fn open(payload: Option<&NavigationPayload>, api: Arc<dyn AnalysisApi>) -> Option<Self> {
        match navigation::resolve(payload) {
            ResultsRoute::Render(snapshot) => Some(Self::from_snapshot(snapshot, api)),
            ResultsRoute::RedirectToStart => None,
        }
    }

    pub fn from_snapshot(snapshot: SessionSnapshot, api: Arc<dyn AnalysisApi>) -> Self {
        let presenter = ResultsPresenter::new(snapshot.results.len());
        let chat = ChatController::new(snapshot.into_session(), api);
        Self { presenter, chat }
    }

    pub fn presenter(&self) -> &ResultsPresenter {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut ResultsPresenter {
        &mut self.presenter
    }

    pub fn chat(&self) -> &ChatController {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut ChatController {
        &mut self.chat
    }

    pub fn report(&self) -> ResultsReport {
        ResultsReport::build(self.chat.session(), &self.presenter)
    }
}

/// Forwards notices, pausing the attached spinner so its redraws and the
/// notice lines do not interleave.
pub struct SpinnerAwareNotifier {
    inner: Arc<dyn Notifier>,
    active: Mutex<Option<ProgressBar>>,
}

impl SpinnerAwareNotifier {
    pub fn new(inner: Arc<dyn Notifier>) -> Self {
        Self {
            inner,
            active: Mutex::new(None),
        }
    }

    pub fn attach(&self, spinner: &ProgressBar) {
        if let Ok(mut active) = self.active.lock() {
            *active = Some(spinner.clone());
        }
    }

    pub fn detach(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active = None;
        }
    }
}

impl Notifier for SpinnerAwareNotifier {
    fn notify(&self, notice: Notice) {
        let active = self.active.lock().ok().and_then(|active| active.clone());
        match active {
            Some(spinner) => spinner.suspend(|| self.inner.notify(notice)),
            None => self.inner.notify(notice),
        }
    }
}

pub struct App {
    config: Config,
    api: Arc<dyn AnalysisApi>,
    notifier: Arc<SpinnerAwareNotifier>,
    reports: ReportGenerator,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn AnalysisApi>, notifier: Arc<dyn Notifier>) -> Self {
        let reports = ReportGenerator::new(config.output.color_output, config.output.progress_width);
        Self {
            config,
            api,
            notifier: Arc::new(SpinnerAwareNotifier::new(notifier)),
            reports,
        }
    }

    pub fn reports(&self) -> &ReportGenerator {
        &self.reports
    }

    pub fn api(&self) -> Arc<dyn AnalysisApi> {
        self.api.clone()
    }

    /// A fresh upload screen with no session yet.
    pub fn upload_controller(&self) -> UploadController {
        UploadController::new(
            self.api.clone(),
            self.notifier.clone(),
            self.config.upload.accepted_extensions.clone(),
        )
    }

    pub async fn submit_with_spinner(&self, controller: &mut UploadController) -> AnalysisOutcome {
        if !controller.can_submit() {
            return controller.submit().await;
        }
        let spinner = spinner("Analyzing resumes...");
        self.notifier.attach(&spinner);
        let outcome = controller.submit().await;
        self.notifier.detach();
        spinner.finish_and_clear();
        outcome
    }

    /// Spins only while a Chat request is actually outstanding.
    pub async fn ask_with_spinner(&self, screen: &mut ResultsScreen, question: &str) -> AskOutcome {
        let pending = match screen.chat_mut().begin_ask(question) {
            BeginAsk::Started(pending) => pending,
            BeginAsk::Ignored => return AskOutcome::Ignored,
            BeginAsk::Busy => return AskOutcome::Busy,
        };

        let spinner = spinner("Thinking...");
        let reply = self.api.chat(pending.session_id(), pending.question()).await;
        spinner.finish_and_clear();
        screen.chat_mut().complete_ask(pending.request_id(), reply)
    }

    pub fn render_results(&self, screen: &ResultsScreen, format: OutputFormat) -> Result<String> {
        self.reports.generate(&screen.report(), format)
    }

    /// Alternate between screens until the user quits.
    pub async fn run_interactive(&self) -> Result<()> {
        let mut input = stdin_lines();
        self.run_from(Route::Start, &mut input).await
    }

    pub async fn run_from(&self, mut route: Route, input: &mut Lines<BufReader<Stdin>>) -> Result<()> {
        loop {
            route = match route {
                Route::Start => match self.run_upload_screen(input).await? {
                    Some(next) => next,
                    None => break,
                },
                Route::Results(payload) => match ResultsScreen::open(payload.as_ref(), self.api.clone()) {
                    Some(mut screen) => match self.run_results_screen(&mut screen, input).await? {
                        Some(next) => next,
                        None => break,
                    },
                    None => {
                        debug!("No session for results screen; back to start");
                        Route::Start
                    }
                },
            };
        }
        Ok(())
    }

    async fn run_upload_screen(&self, input: &mut Lines<BufReader<Stdin>>) -> Result<Option<Route>> {
        let mut controller = self.upload_controller();
        println!("\n💼 AI Recruitment Assistant: new analysis (/help for commands)");

        while let Some(line) = read_line(input, "upload").await? {
            let Some(command) = UploadCommand::parse(&line) else {
                continue;
            };
            match command {
                UploadCommand::JobDescription(text) => {
                    controller.set_job_description(text)?;
                    println!("Job description set ({} characters)", controller.job_description().len());
                }
                UploadCommand::JobDescriptionFile(path) => {
                    match crate::input::InputManager::new().load_job_description(&path).await {
                        Ok(text) => {
                            controller.set_job_description(text)?;
                            println!("Job description loaded from {}", path.display());
                        }
                        Err(e) => self.warn(e.to_string()),
                    }
                }
                UploadCommand::Add(paths) => {
                    let selection = controller.add_files(paths)?;
                    println!("Added {} file(s)", selection.added);
                    print!("{}", self.reports.console().format_selected_files(controller.pending_files()));
                }
                UploadCommand::Remove(index) => match controller.remove_file(index) {
                    Ok(removed) => println!("Removed {}", removed.name),
                    Err(e) => self.warn(e.to_string()),
                },
                UploadCommand::Files => {
                    print!("{}", self.reports.console().format_selected_files(controller.pending_files()));
                }
                UploadCommand::Submit => {
                    if let AnalysisOutcome::Ready(payload) = self.submit_with_spinner(&mut controller).await {
                        return Ok(Some(Route::Results(Some(payload))));
                    }
                }
                UploadCommand::Help => println!("{}", UPLOAD_HELP),
                UploadCommand::Quit => return Ok(None),
                UploadCommand::Unknown(text) => self.warn(format!("Unknown command: {}", text)),
            }
        }
        Ok(None)
    }

    /// Results screen loop; also used by `analyze --chat`.
    pub async fn run_results_screen(
        &self,
        screen: &mut ResultsScreen,
        input: &mut Lines<BufReader<Stdin>>,
    ) -> Result<Option<Route>> {
        println!("{}", self.render_results(screen, OutputFormat::Console)?);
        for turn in screen.chat().transcript() {
            println!("{}", self.reports.console().format_turn(turn));
        }

        while let Some(line) = read_line(input, "results").await? {
            let Some(command) = ResultsCommand::parse(&line) else {
                continue;
            };
            match command {
                ResultsCommand::List => println!("{}", self.render_results(screen, OutputFormat::Console)?),
                ResultsCommand::Toggle(index) => match screen.presenter_mut().toggle(index) {
                    Ok(_) => println!("{}", self.render_results(screen, OutputFormat::Console)?),
                    Err(e) => self.warn(e.to_string()),
                },
                ResultsCommand::ExpandAll => {
                    screen.presenter_mut().expand_all();
                    println!("{}", self.render_results(screen, OutputFormat::Console)?);
                }
                ResultsCommand::CollapseAll => {
                    screen.presenter_mut().collapse_all();
                    println!("{}", self.render_results(screen, OutputFormat::Console)?);
                }
                ResultsCommand::Ask(question) => {
                    let before = screen.chat().transcript().len();
                    let outcome = self.ask_with_spinner(screen, &question).await;
                    if outcome == AskOutcome::Busy {
                        self.warn("Still waiting on the previous answer".to_string());
                    }
                    // The user's own turn was already echoed by the terminal.
                    for turn in screen.chat().transcript().iter().skip(before + 1) {
                        println!("{}", self.reports.console().format_turn(turn));
                    }
                }
                ResultsCommand::New => {
                    info!("Starting a new analysis");
                    return Ok(Some(Route::Start));
                }
                ResultsCommand::Help => println!("{}", RESULTS_HELP),
                ResultsCommand::Quit => return Ok(None),
                ResultsCommand::Unknown(text) => self.warn(format!("Unknown command: {}", text)),
            }
        }
        Ok(None)
    }

    fn warn(&self, message: String) {
        self.notifier.notify(Notice::new(NoticeLevel::Warning, message));
    }
}

/// Open stdin for a results screen entered outside `run_interactive`.
pub fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

async fn read_line(input: &mut Lines<BufReader<Stdin>>, screen: &str) -> Result<Option<String>> {
    use std::io::Write;
    print!("{} › ", screen);
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Analysis;
    use crate::error::ApiError;
    use crate::session::{FileHandle, ResultId, ResumeResult};
    use crate::upload::RecordingNotifier;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CannedApi {
        chat_calls: AtomicUsize,
    }

    #[async_trait]
    impl AnalysisApi for CannedApi {
        async fn analyze(&self, _job_description: &str, files: &[FileHandle]) -> std::result::Result<Analysis, ApiError> {
            Ok(Analysis {
                session_id: "s1".to_string(),
                results: files
                    .iter()
                    .enumerate()
                    .map(|(i, f)| ResumeResult {
                        id: ResultId::Number(i as i64 + 1),
                        filename: f.name.clone(),
                        match_percentage: 80.0,
                        summary: None,
                        strengths: vec![],
                        weaknesses: vec![],
                    })
                    .collect(),
            })
        }

        async fn chat(&self, _session_id: &str, _question: &str) -> std::result::Result<String, ApiError> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            Ok("Both know Go.".to_string())
        }
    }

    fn test_app(api: Arc<CannedApi>, notifier: Arc<RecordingNotifier>) -> App {
        let mut config = Config::default();
        config.output.color_output = false;
        App::new(config, api, notifier)
    }

    #[test]
    fn test_spinner_aware_notifier_forwards_while_attached() {
        let recorder = Arc::new(RecordingNotifier::new());
        let notifier = SpinnerAwareNotifier::new(recorder.clone());
        let spinner = ProgressBar::hidden();

        notifier.notify(Notice::new(NoticeLevel::Info, "before"));
        notifier.attach(&spinner);
        notifier.notify(Notice::new(NoticeLevel::Info, "during"));
        notifier.detach();
        notifier.notify(Notice::new(NoticeLevel::Info, "after"));

        let titles: Vec<String> = recorder.notices().into_iter().map(|n| n.title).collect();
        assert_eq!(titles, vec!["before", "during", "after"]);
    }

    #[tokio::test]
    async fn test_submit_with_spinner_delivers_every_notice() {
        let recorder = Arc::new(RecordingNotifier::new());
        let app = test_app(Arc::new(CannedApi::default()), recorder.clone());
        let mut controller = app.upload_controller();
        controller.set_job_description("Senior backend engineer").unwrap();
        controller.add_files(vec![PathBuf::from("a.pdf")]).unwrap();

        assert!(matches!(app.submit_with_spinner(&mut controller).await, AnalysisOutcome::Ready(_)));
        let levels: Vec<NoticeLevel> = recorder.notices().into_iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![NoticeLevel::Info, NoticeLevel::Success]);
    }

    #[tokio::test]
    async fn test_ask_with_spinner_only_calls_for_real_questions() {
        let api = Arc::new(CannedApi::default());
        let app = test_app(api.clone(), Arc::new(RecordingNotifier::new()));
        let snapshot = SessionSnapshot {
            session_id: "s1".to_string(),
            job_description: "jd".to_string(),
            results: vec![],
        };
        let mut screen = ResultsScreen::from_snapshot(snapshot, app.api());

        assert_eq!(app.ask_with_spinner(&mut screen, "   ").await, AskOutcome::Ignored);
        assert_eq!(api.chat_calls.load(Ordering::SeqCst), 0);

        assert_eq!(app.ask_with_spinner(&mut screen, "Who knows Go?").await, AskOutcome::Answered);
        assert_eq!(api.chat_calls.load(Ordering::SeqCst), 1);
        assert_eq!(screen.chat().transcript().last().unwrap().text, "Both know Go.");
        assert!(!screen.chat().is_busy());
    }

    #[test]
    fn test_upload_command_parsing() {
        assert_eq!(
            UploadCommand::parse("/jd Senior backend engineer"),
            Some(UploadCommand::JobDescription("Senior backend engineer".to_string()))
        );
        assert_eq!(
            UploadCommand::parse("/add a.pdf b.docx"),
            Some(UploadCommand::Add(vec![PathBuf::from("a.pdf"), PathBuf::from("b.docx")]))
        );
        assert_eq!(UploadCommand::parse("/remove 2"), Some(UploadCommand::Remove(1)));
        assert!(matches!(UploadCommand::parse("/remove 0"), Some(UploadCommand::Unknown(_))));
        assert!(matches!(UploadCommand::parse("/add"), Some(UploadCommand::Unknown(_))));
        assert_eq!(UploadCommand::parse("   "), None);
    }

    #[test]
    fn test_results_command_parsing() {
        assert_eq!(ResultsCommand::parse("/toggle 1"), Some(ResultsCommand::Toggle(0)));
        assert_eq!(ResultsCommand::parse("/new"), Some(ResultsCommand::New));
        assert_eq!(
            ResultsCommand::parse("Who has Kubernetes experience?"),
            Some(ResultsCommand::Ask("Who has Kubernetes experience?".to_string()))
        );
        assert!(matches!(ResultsCommand::parse("/toggle x"), Some(ResultsCommand::Unknown(_))));
        assert_eq!(ResultsCommand::parse(""), None);
    }
}
