use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and overriding configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Response cleaning config
    #[serde(default)]
    pub response: ResponseConfig,

    /// Output artifact config
    #[serde(default)]
    pub output: OutputConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Generation service settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    // @field: Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Service base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Max chars per request before the text is split into chunks
    #[serde(default = "default_max_chars_per_request")]
    pub max_chars_per_request: usize,

    // @field: Retries after the first failed attempt
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    // @field: Fixed pause between attempts
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    // @field: Timeout seconds for a single HTTP call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Temperature parameter for text generation (0.0 to 1.0)
    /// Unset leaves the model default in place
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Instruction template sent ahead of the source text
    /// Placeholders: {source_language}, {target_language}, {start_tag}, {end_tag}
    #[serde(default = "default_instruction")]
    pub instruction: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            max_chars_per_request: default_max_chars_per_request(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
            instruction: default_instruction(),
        }
    }
}

/// Settings for extracting the translation out of a raw model response
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResponseConfig {
    /// Opening delimiter the model is asked to emit
    #[serde(default = "default_start_tag")]
    pub start_tag: String,

    /// Closing delimiter the model is asked to emit
    #[serde(default = "default_end_tag")]
    pub end_tag: String,

    /// Lowercased line prefixes dropped when no delimiter pair is present
    #[serde(default = "default_reasoning_markers")]
    pub reasoning_markers: Vec<String>,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            start_tag: default_start_tag(),
            end_tag: default_end_tag(),
            reasoning_markers: default_reasoning_markers(),
        }
    }
}

/// Settings for the per-section artifacts
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// Write the plain-text mirror next to each document
    #[serde(default = "default_true")]
    pub write_plain_text: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_plain_text: true,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "zh-Hans".to_string()
}

fn default_model() -> String {
    "qwen3:8b".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_max_chars_per_request() -> usize {
    1500
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_true() -> bool {
    true
}

fn default_start_tag() -> String {
    "<translation>".to_string()
}

fn default_end_tag() -> String {
    "</translation>".to_string()
}

fn default_instruction() -> String {
    "Translate the following {source_language} text to {target_language} only. \
     Do not explain, show reasoning, or repeat the {source_language} text. \
     Wrap the final translation inside {start_tag} and {end_tag} tags."
        .to_string()
}

fn default_reasoning_markers() -> Vec<String> {
    [
        "思考",
        "推理",
        "分析",
        "thinking",
        "reasoning",
        "analysis",
        "thought",
        "original",
        "source",
        "translation",
    ]
    .iter()
    .map(|marker| marker.to_string())
    .collect()
}

impl Config {
    /// Load configuration from a JSON file, falling back to defaults when it is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config file not found at {:?}, using defaults.", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Validate languages
        let _source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let _target_name = crate::language_utils::get_language_name(&self.target_language)?;

        if self.translation.model.trim().is_empty() {
            return Err(anyhow!("A model identifier is required"));
        }

        Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid service endpoint: {}", self.translation.endpoint))?;

        if self.translation.max_chars_per_request == 0 {
            return Err(anyhow!("max_chars_per_request must be greater than zero"));
        }

        if self.response.start_tag.is_empty() || self.response.end_tag.is_empty() {
            return Err(anyhow!("Both response delimiters must be non-empty"));
        }

        Ok(())
    }

    /// Render the instruction template with language names and delimiters
    pub fn render_instruction(&self) -> Result<String> {
        let source_name = crate::language_utils::get_language_name(&self.source_language)?;
        let target_name = crate::language_utils::get_language_name(&self.target_language)?;

        Ok(self.translation.instruction
            .replace("{source_language}", &source_name)
            .replace("{target_language}", &target_name)
            .replace("{start_tag}", &self.response.start_tag)
            .replace("{end_tag}", &self.response.end_tag))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            response: ResponseConfig::default(),
            output: OutputConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
