//! User-facing notices raised by the upload flow

use colored::{Color, Colorize};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The text a toast would show: the description when present, else the title.
    pub fn text(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.title)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Prints notices to stderr so report output on stdout stays clean.
pub struct TerminalNotifier {
    use_colors: bool,
}

impl TerminalNotifier {
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    fn render(&self, notice: &Notice) -> String {
        let (icon, plain_icon, color) = match notice.level {
            NoticeLevel::Info => ("ℹ️ ", "[i]", Color::Cyan),
            NoticeLevel::Success => ("✅", "[ok]", Color::Green),
            NoticeLevel::Warning => ("⚠️ ", "[!]", Color::Yellow),
            NoticeLevel::Error => ("❌", "[x]", Color::Red),
        };

        let mut line = if self.use_colors {
            format!("{} {}", icon, notice.title.color(color).bold())
        } else {
            format!("{} {}", plain_icon, notice.title)
        };
        if let Some(description) = &notice.description {
            line.push_str(&format!(": {}", description));
        }
        line
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", self.render(&notice));
    }
}

/// Keeps every notice in memory, in order.
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices().pop()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
