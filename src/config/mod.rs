use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::utils::sanitize_filename;

const DEFAULT_TRANSCRIPT_FILE: &str = "transcription.txt";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Completion service configuration
    pub openai: OpenAiConfig,

    /// Transcript retrieval settings
    pub transcript: TranscriptConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Chat completions endpoint
    pub api_url: String,

    /// Model identifier
    pub model: String,

    /// System turn establishing the summarizer role
    pub system_prompt: String,

    /// Instruction placed before the transcript in the user turn
    pub user_prompt_prefix: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptConfig {
    /// Preferred transcript languages, in order
    pub languages: Vec<String>,

    /// yt-dlp executable
    pub yt_dlp_path: String,

    /// Timeout for the whole transcript fetch in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default file name for the exported transcript
    pub transcript_file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openai: OpenAiConfig {
                api_url: "https://api.openai.com/v1/chat/completions".to_string(),
                model: "gpt-4o-mini".to_string(),
                system_prompt: "You are an assistant that summarizes texts.".to_string(),
                user_prompt_prefix: "Summarize the following text:".to_string(),
                timeout_secs: 120,
            },
            transcript: TranscriptConfig {
                languages: vec!["pt".to_string()],
                yt_dlp_path: "yt-dlp".to_string(),
                timeout_secs: 60,
            },
            app: AppConfig {
                transcript_file_name: DEFAULT_TRANSCRIPT_FILE.to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::config_path()? {
            Some(path) => Self::load_from(&path),
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load and validate a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let mut config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;
        config.transcript.languages = clean_languages(&config.transcript.languages);

        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write configuration to the given file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Write the default configuration to the user config directory
    pub fn init() -> Result<PathBuf> {
        let path = Self::user_config_path()?;
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }

        Self::default().save_to(&path)?;
        Ok(path)
    }

    /// Existing configuration file, if any
    fn config_path() -> Result<Option<PathBuf>> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(Some(local_config));
        }

        let user_config = Self::user_config_path()?;
        Ok(user_config.exists().then_some(user_config))
    }

    fn user_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("yt-summarizer").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let api_url = Url::parse(&self.openai.api_url)
            .with_context(|| format!("Invalid completion endpoint: {}", self.openai.api_url))?;
        if !matches!(api_url.scheme(), "http" | "https") {
            anyhow::bail!("Completion endpoint must use HTTP or HTTPS protocol");
        }

        if self.openai.model.trim().is_empty() {
            anyhow::bail!("A model must be configured");
        }

        if self.transcript.languages.is_empty() {
            anyhow::bail!("At least one transcript language must be configured");
        }
        if self.transcript.languages.iter().any(|lang| lang.trim().is_empty()) {
            anyhow::bail!("Transcript languages must not be blank");
        }

        if self.openai.timeout_secs == 0 || self.transcript.timeout_secs == 0 {
            anyhow::bail!("Timeouts must be greater than zero");
        }

        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(
        mut self,
        languages: &[String],
        model: Option<&str>,
        api_url: Option<&str>,
    ) -> Result<Self> {
        let languages = clean_languages(languages);
        if !languages.is_empty() {
            self.transcript.languages = languages;
        }
        if let Some(model) = model {
            self.openai.model = model.to_string();
        }
        if let Some(api_url) = api_url {
            self.openai.api_url = api_url.to_string();
        }

        self.validate()?;
        Ok(self)
    }

    /// Display current configuration
    pub fn display(&self, api_key: Option<&str>) {
        println!("Current Configuration:");
        println!("  Endpoint: {}", self.openai.api_url);
        println!("  Model: {}", self.openai.model);
        println!("  API Key: {}", mask_key(api_key));
        println!("  Languages: {}", self.transcript.languages.join(", "));
        println!("  yt-dlp: {}", self.transcript.yt_dlp_path);
        println!("  Transcript File: {}", self.app.transcript_file_name);
    }

    /// Default export path for the transcript, relative to the working directory
    pub fn transcript_file(&self) -> PathBuf {
        match sanitize_filename(&self.app.transcript_file_name) {
            Some(name) => PathBuf::from(name),
            None => {
                tracing::warn!(
                    "Ignoring unusable transcript file name {:?}",
                    self.app.transcript_file_name
                );
                PathBuf::from(DEFAULT_TRANSCRIPT_FILE)
            }
        }
    }

    pub fn transcript_timeout(&self) -> Duration {
        Duration::from_secs(self.transcript.timeout_secs)
    }
}

/// Trimmed language codes with blank entries dropped
fn clean_languages(languages: &[String]) -> Vec<String> {
    languages
        .iter()
        .map(|lang| lang.trim().to_string())
        .filter(|lang| !lang.is_empty())
        .collect()
}

fn mask_key(api_key: Option<&str>) -> String {
    match api_key {
        Some(key) if key.len() > 8 && key.is_ascii() => {
            format!("{}...{}", &key[..3], &key[key.len() - 4..])
        }
        Some(_) => "****".to_string(),
        None => "(not set)".to_string(),
    }
}
