//! CLI interface for the resume screener

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-screener")]
#[command(about = "Screen a batch of resumes against a job description")]
#[command(long_about = "Submit a job description and resumes to the analysis service, review the ranked matches, and chat about the batch")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis service base URL (overrides the config file)
    #[arg(long, global = true, env = "RESUME_SCREENER_API_URL")]
    pub api_url: Option<String>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze resumes against a job description
    Analyze {
        /// Path to job description file (TXT, MD)
        #[arg(short, long, conflicts_with = "jd_text")]
        job: Option<PathBuf>,

        /// Job description given inline
        #[arg(long)]
        jd_text: Option<String>,

        /// Resume file (PDF, DOC, DOCX); repeat for each resume
        #[arg(short, long = "resume", required = true)]
        resumes: Vec<PathBuf>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Show every entry expanded
        #[arg(short, long)]
        expand: bool,

        /// Save the rendered report to a file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Stay on the results screen to chat about the batch
        #[arg(long)]
        chat: bool,
    },

    /// Interactive upload and results screens
    Start,

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "api.base_url")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<crate::config::OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(crate::config::OutputFormat::Console),
        "json" => Ok(crate::config::OutputFormat::Json),
        "markdown" | "md" => Ok(crate::config::OutputFormat::Markdown),
        _ => Err(format!("Invalid output format: {}. Supported: console, json, markdown", format)),
    }
}
