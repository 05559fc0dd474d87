//! Configuration management for the resume screener

use crate::error::{Result, ScreenerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ANALYZE_PATH: &str = "/api/analyze-resumes";
pub const CHAT_PATH: &str = "/api/chat";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub upload: UploadConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    /// Unset means the transport default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub accepted_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub color_output: bool,
    pub progress_width: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                base_url: "http://localhost:8000".to_string(),
                request_timeout_secs: None,
            },
            upload: UploadConfig {
                accepted_extensions: vec!["pdf".to_string(), "doc".to_string(), "docx".to_string()],
            },
            output: OutputConfig {
                format: OutputFormat::Console,
                color_output: true,
                progress_width: 24,
            },
        }
    }
}

impl Config {
    /// Load from `config_path`, writing defaults there on first run.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| ScreenerError::Configuration(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-screener")
            .join("config.toml")
    }

    /// Apply a `section.key = value` assignment from `config set`.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.base_url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(ScreenerError::Configuration(format!(
                        "api.base_url must start with http:// or https://, got '{}'",
                        value
                    )));
                }
                self.api.base_url = value.trim_end_matches('/').to_string();
            }
            "api.request_timeout_secs" => {
                self.api.request_timeout_secs = match value {
                    "" | "none" => None,
                    secs => Some(parse_number(key, secs)?),
                };
            }
            "upload.accepted_extensions" => {
                let extensions: Vec<String> = value
                    .split(',')
                    .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                    .filter(|ext| !ext.is_empty())
                    .collect();
                if extensions.is_empty() {
                    return Err(ScreenerError::Configuration(
                        "upload.accepted_extensions needs at least one extension".to_string(),
                    ));
                }
                self.upload.accepted_extensions = extensions;
            }
            "output.format" => {
                self.output.format = crate::cli::parse_output_format(value)
                    .map_err(ScreenerError::Configuration)?;
            }
            "output.color_output" => {
                self.output.color_output = value.parse().map_err(|_| {
                    ScreenerError::Configuration(format!("{} expects true or false", key))
                })?;
            }
            "output.progress_width" => {
                self.output.progress_width = parse_number(key, value)?;
            }
            _ => {
                return Err(ScreenerError::Configuration(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        Ok(())
    }

    pub fn analyze_url(&self) -> String {
        format!("{}{}", self.api.base_url.trim_end_matches('/'), ANALYZE_PATH)
    }

    pub fn chat_url(&self) -> String {
        format!("{}{}", self.api.base_url.trim_end_matches('/'), CHAT_PATH)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| ScreenerError::Configuration(format!("{} expects a number, got '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_endpoint_urls_join_base() {
        let mut config = Config::default();
        assert_eq!(config.analyze_url(), "http://localhost:8000/api/analyze-resumes");

        config.api.base_url = "https://screening.example.com/".to_string();
        assert_eq!(config.chat_url(), "https://screening.example.com/api/chat");
    }

    #[test]
    fn test_set_value_known_keys() {
        let mut config = Config::default();
        config.set_value("api.base_url", "http://10.0.0.5:9000/").unwrap();
        config.set_value("api.request_timeout_secs", "30").unwrap();
        config.set_value("upload.accepted_extensions", "PDF, .txt").unwrap();
        config.set_value("output.format", "json").unwrap();
        config.set_value("output.color_output", "false").unwrap();

        assert_eq!(config.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(config.api.request_timeout_secs, Some(30));
        assert_eq!(config.upload.accepted_extensions, vec!["pdf", "txt"]);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.color_output);

        config.set_value("api.request_timeout_secs", "none").unwrap();
        assert_eq!(config.api.request_timeout_secs, None);
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set_value("api.base_url", "localhost:8000").is_err());
        assert!(config.set_value("output.progress_width", "wide").is_err());
        assert!(config.set_value("scoring.weight", "1").is_err());
    }

    #[test]
    fn test_load_writes_defaults_then_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert!(path.exists());

        let mut changed = first.clone();
        changed.output.progress_width = 40;
        changed.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.output.progress_width, 40);
        assert_eq!(reloaded.api.base_url, first.api.base_url);
    }
}
