//! Output formatters for the results screen, chat transcript, and upload list

use crate::config::OutputFormat;
use crate::error::{Result, ScreenerError};
use crate::output::report::ResultsReport;
use crate::results::EntryView;
use crate::session::{ChatTurn, FileHandle, Sender};
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for formatting a results report
pub trait OutputFormatter {
    fn format_report(&self, report: &ResultsReport) -> Result<String>;
}

/// Coloured terminal rendering with progress bars and chevrons
pub struct ConsoleFormatter {
    use_colors: bool,
    progress_width: usize,
}

/// JSON for piping into other tools
pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that coordinates the formatters
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    plain_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, progress_width: usize) -> Self {
        Self {
            use_colors,
            progress_width: progress_width.max(1),
        }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".blue().bold(), title.blue().bold())
        } else {
            format!("\n# {}\n", title)
        }
    }

    fn score_color(percentage: i64) -> Color {
        match percentage {
            80..=i64::MAX => Color::Green,
            60..=79 => Color::Yellow,
            _ => Color::Red,
        }
    }

    pub fn progress_bar(&self, fraction: f64) -> String {
        let filled = (fraction.clamp(0.0, 1.0) * self.progress_width as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled),
            "░".repeat(self.progress_width - filled)
        );
        format!("[{}]", bar)
    }

    pub fn format_entry(&self, entry: &EntryView) -> String {
        let chevron = if entry.expanded { "▾" } else { "▸" };
        let label = if self.use_colors {
            entry
                .label
                .color(Self::score_color(entry.percentage))
                .bold()
                .to_string()
        } else {
            entry.label.clone()
        };

        let mut output = format!(
            "{} {:>2}. {}  {}\n      {}\n",
            chevron,
            entry.position,
            if self.use_colors {
                entry.filename.bold().to_string()
            } else {
                entry.filename.clone()
            },
            label,
            self.progress_bar(entry.progress)
        );

        if let Some(details) = &entry.details {
            output.push_str(&format!("      {}\n", self.colorize("Summary", Color::Cyan)));
            output.push_str(&format!("        {}\n", details.summary));
            output.push_str(&format!("      {}\n", self.colorize("Strengths", Color::Green)));
            for strength in &details.strengths {
                output.push_str(&format!("        • {}\n", strength));
            }
            output.push_str(&format!("      {}\n", self.colorize("Weaknesses", Color::Red)));
            for weakness in &details.weaknesses {
                output.push_str(&format!("        • {}\n", weakness));
            }
        }
        output
    }

    pub fn format_turn(&self, turn: &ChatTurn) -> String {
        match turn.sender {
            Sender::User => format!("{} {}", self.colorize("you ›", Color::Blue), turn.text),
            Sender::Bot => format!("{} {}", self.colorize(" ai ›", Color::Magenta), turn.text),
        }
    }

    pub fn format_selected_files(&self, files: &[FileHandle]) -> String {
        if files.is_empty() {
            return "No files selected.\n".to_string();
        }
        let mut output = String::from("Selected Files:\n");
        for (i, file) in files.iter().enumerate() {
            output.push_str(&format!("  {}. 📄 {}\n", i + 1, file.name));
        }
        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ResultsReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header("Ranked Resumes"));
        output.push_str(&format!(
            "Position: {} | Session: {} | Generated: {}\n\n",
            report.job_title(),
            report.session_id,
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if report.entries.is_empty() {
            output.push_str("No resumes were returned for this batch.\n");
        }
        for entry in &report.entries {
            output.push_str(&self.format_entry(entry));
        }
        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ResultsReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)?
        } else {
            serde_json::to_string(report)?
        };
        Ok(json)
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ResultsReport) -> Result<String> {
        let mut output = String::new();

        output.push_str("# Ranked Resumes\n\n");
        if self.include_metadata {
            output.push_str(&format!("**Position:** {}  \n", report.job_title()));
            output.push_str(&format!("**Session:** `{}`  \n", report.session_id));
            output.push_str(&format!(
                "**Generated:** {}\n\n",
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }

        output.push_str("| # | File | Match |\n|---|------|-------|\n");
        for entry in &report.entries {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                entry.position,
                entry.filename.replace('|', "\\|"),
                entry.label
            ));
        }

        for entry in report.entries.iter().filter(|e| e.details.is_some()) {
            if let Some(details) = &entry.details {
                output.push_str(&format!("\n## {}. {} ({})\n\n", entry.position, entry.filename, entry.label));
                output.push_str(&format!("### Summary\n\n{}\n\n", details.summary));
                output.push_str("### Strengths\n\n");
                for strength in &details.strengths {
                    output.push_str(&format!("- {}\n", strength));
                }
                output.push_str("\n### Weaknesses\n\n");
                for weakness in &details.weaknesses {
                    output.push_str(&format!("- {}\n", weakness));
                }
            }
        }
        Ok(output)
    }
}

impl ReportGenerator {
    pub fn new(use_colors: bool, progress_width: usize) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, progress_width),
            plain_formatter: ConsoleFormatter::new(false, progress_width),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn console(&self) -> &ConsoleFormatter {
        &self.console_formatter
    }

    pub fn generate(&self, report: &ResultsReport, format: OutputFormat) -> Result<String> {
        let formatter: &dyn OutputFormatter = match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        };
        formatter.format_report(report)
    }

    /// Write `report` to `path`. Console output is rendered without colour.
    pub fn save_report(&self, report: &ResultsReport, format: OutputFormat, path: &Path) -> Result<()> {
        let content = match format {
            OutputFormat::Console => self.plain_formatter.format_report(report)?,
            other => self.generate(report, other)?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            ScreenerError::OutputFormatting(format!("Failed to write {}: {}", path.display(), e))
        })
    }
}
