//! Resume screener: batch resume analysis and follow-up chat from the terminal

use anyhow::Context;
use clap::Parser;
use log::{error, info};
use resume_screener::api::HttpAnalysisApi;
use resume_screener::app::{stdin_lines, App, ResultsScreen};
use resume_screener::cli::{self, Cli, Commands, ConfigAction};
use resume_screener::config::Config;
use resume_screener::input::InputManager;
use resume_screener::upload::{AnalysisOutcome, TerminalNotifier};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if cli.no_color {
        config.output.color_output = false;
    }

    match run_command(cli.command, config, &config_path).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Command failed: {:#}", e);
            process::exit(1);
        }
    }
}

/// `Ok(false)` means the command ran but the analysis did not succeed.
async fn run_command(command: Commands, config: Config, config_path: &Path) -> anyhow::Result<bool> {
    match command {
        Commands::Analyze {
            job,
            jd_text,
            resumes,
            output,
            expand,
            save,
            chat,
        } => {
            let format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(anyhow::Error::msg)?,
                None => config.output.format,
            };
            let job_description = read_job_description(job, jd_text).await?;
            let app = build_app(config)?;

            info!("Starting resume analysis for {} files", resumes.len());
            let mut controller = app.upload_controller();
            controller.set_job_description(job_description)?;
            controller.add_files(resumes)?;

            let payload = match app.submit_with_spinner(&mut controller).await {
                AnalysisOutcome::Ready(payload) => payload,
                AnalysisOutcome::Rejected | AnalysisOutcome::Failed { .. } => return Ok(false),
            };

            let Some(mut screen) = ResultsScreen::open(Some(&payload), app.api()) else {
                error!("Analysis finished without a usable session");
                return Ok(false);
            };
            if expand {
                screen.presenter_mut().expand_all();
            }

            println!("{}", app.render_results(&screen, format)?);
            if let Some(path) = save {
                app.reports()
                    .save_report(&screen.report(), format, &path)
                    .with_context(|| format!("saving report to {}", path.display()))?;
                println!("💾 Report saved to {}", path.display());
            }

            if chat {
                let mut input = stdin_lines();
                if let Some(next) = app.run_results_screen(&mut screen, &mut input).await? {
                    app.run_from(next, &mut input).await?;
                }
            }
            Ok(true)
        }

        Commands::Start => {
            let app = build_app(config)?;
            app.run_interactive().await?;
            Ok(true)
        }

        Commands::Config { action } => {
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("⚙️  Current Configuration ({})\n", config_path.display());
                    println!("API base URL: {}", config.api.base_url);
                    println!(
                        "Request timeout: {}",
                        config
                            .api
                            .request_timeout_secs
                            .map(|s| format!("{}s", s))
                            .unwrap_or_else(|| "transport default".to_string())
                    );
                    println!("Accepted resume types: {}", config.upload.accepted_extensions.join(", "));
                    println!("Output format: {:?}", config.output.format);
                    println!("Colour output: {}", config.output.color_output);
                    println!("Progress bar width: {}", config.output.progress_width);
                }

                Some(ConfigAction::Reset) => {
                    println!("🔄 Resetting configuration to defaults...");
                    Config::default().save_to(config_path)?;
                    println!("✅ Configuration reset successfully!");
                }

                Some(ConfigAction::Set { key, value }) => {
                    // Edit the file as stored, not the copy with CLI overrides applied.
                    let mut stored = Config::load_from(config_path)?;
                    stored.set_value(&key, &value)?;
                    stored.save_to(config_path)?;
                    println!("🔧 {} = {}", key, value);
                }
            }
            Ok(true)
        }
    }
}

fn build_app(config: Config) -> anyhow::Result<App> {
    let api = HttpAnalysisApi::from_config(&config).context("building HTTP client")?;
    let notifier = TerminalNotifier::new(config.output.color_output);
    Ok(App::new(config, Arc::new(api), Arc::new(notifier)))
}

async fn read_job_description(job: Option<PathBuf>, jd_text: Option<String>) -> anyhow::Result<String> {
    match (job, jd_text) {
        (Some(path), _) => InputManager::new()
            .load_job_description(&path)
            .await
            .with_context(|| format!("reading job description {}", path.display())),
        (None, Some(text)) => Ok(text),
        (None, None) => Ok(String::new()),
    }
}
