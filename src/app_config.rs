use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::AppError;
use crate::prompts::PromptTemplates;

/// Application configuration module
/// This module handles loading and validating the YAML configuration:
/// per-backend models and endpoints, prompt templates, timeouts and limits.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Deadline for a single backend call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub http_timeout_seconds: u64,

    /// Maximum size of file or stdin input, in KB
    #[serde(default = "default_input_file_limit_kb", rename = "inputFileLimitKB")]
    pub input_file_limit_kb: usize,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Model identifier per backend
    #[serde(default)]
    pub models: ModelsConfig,

    /// Prompt templates per operation
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Endpoint URL per backend
    #[serde(default, rename = "baseEndpoint")]
    pub base_endpoints: EndpointsConfig,

    /// OpenAI-specific request settings
    #[serde(default)]
    pub openai: OpenAIConfig,

    /// Claude-specific request settings
    #[serde(default)]
    pub claude: ClaudeConfig,
}

/// Backend selected for an invocation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    // @provider: Google Gemini generateContent API
    Gemini,
    // @provider: OpenAI chat completions API
    OpenAI,
    // @provider: Anthropic Claude messages API
    Claude,
    // @provider: Local Ollama server
    #[default]
    Ollama,
}

impl ProviderKind {
    /// All backends in declaration order
    pub const ALL: [ProviderKind; 4] = [Self::Gemini, Self::OpenAI, Self::Claude, Self::Ollama];

    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
            Self::Claude => "Claude",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenAI => "openai".to_string(),
            Self::Claude => "claude".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }

    /// Environment variable holding the API key, `None` for local backends
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("GEMINI_API_KEY"),
            Self::OpenAI => Some("OPENAI_API_KEY"),
            Self::Claude => Some("CLAUDE_API_KEY"),
            Self::Ollama => None,
        }
    }

    /// Whether the backend is hosted and needs a credential
    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

// Implement Display trait for ProviderKind
impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for ProviderKind
impl std::str::FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "claude" => Ok(Self::Claude),
            // An unspecified provider falls back to the local backend
            "ollama" | "" => Ok(Self::Ollama),
            _ => Err(AppError::Config(format!("Provider not implemented: {}", s))),
        }
    }
}

/// Settings handed to one provider constructor
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    pub kind: ProviderKind,

    // @field: Model name
    pub model: String,

    // @field: Service URL
    pub endpoint: String,

    // @field: API key, empty when absent
    pub api_key: String,
}

impl ProviderConfig {
    // @param kind: Provider enum
    // @returns: Provider config with default model and endpoint
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: ModelsConfig::default().for_provider(kind).to_string(),
            endpoint: EndpointsConfig::default().for_provider(kind).to_string(),
            api_key: String::new(),
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Set the endpoint URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// True when no usable API key was supplied
    pub fn api_key_missing(&self) -> bool {
        self.api_key.trim().is_empty()
    }
}

/// Model identifiers per backend
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ModelsConfig {
    #[serde(default = "default_gemini_model")]
    pub gemini: String,
    #[serde(default = "default_openai_model")]
    pub openai: String,
    #[serde(default = "default_claude_model")]
    pub claude: String,
    #[serde(default = "default_ollama_model")]
    pub ollama: String,
}

impl ModelsConfig {
    pub fn for_provider(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAI => &self.openai,
            ProviderKind::Claude => &self.claude,
            ProviderKind::Ollama => &self.ollama,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            gemini: default_gemini_model(),
            openai: default_openai_model(),
            claude: default_claude_model(),
            ollama: default_ollama_model(),
        }
    }
}

/// Endpoint URLs per backend
///
/// Gemini's entry is the models base; the model name and `:generateContent`
/// are appended per call. The others are complete request URLs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EndpointsConfig {
    #[serde(default = "default_gemini_endpoint")]
    pub gemini: String,
    #[serde(default = "default_openai_endpoint")]
    pub openai: String,
    #[serde(default = "default_claude_endpoint")]
    pub claude: String,
    #[serde(default = "default_ollama_endpoint")]
    pub ollama: String,
}

impl EndpointsConfig {
    pub fn for_provider(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::OpenAI => &self.openai,
            ProviderKind::Claude => &self.claude,
            ProviderKind::Ollama => &self.ollama,
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            gemini: default_gemini_endpoint(),
            openai: default_openai_endpoint(),
            claude: default_claude_endpoint(),
            ollama: default_ollama_endpoint(),
        }
    }
}

/// Prompt templates per operation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PromptsConfig {
    /// Prefix for rewrite requests
    #[serde(default = "default_rewrite_prompt")]
    pub rewrite: String,

    /// Prefix for translate requests
    /// Placeholder: {target_language}
    #[serde(default = "default_translate_prompt")]
    pub translate: String,

    /// Prefix for summarize requests
    #[serde(default = "default_summarize_prompt")]
    pub summarize: String,
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            rewrite: default_rewrite_prompt(),
            translate: default_translate_prompt(),
            summarize: default_summarize_prompt(),
        }
    }
}

/// OpenAI chat request settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenAIConfig {
    /// System message sent ahead of the user prompt
    #[serde(default = "default_openai_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation
    #[serde(default = "default_openai_temperature")]
    pub temperature: f32,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_openai_system_prompt(),
            temperature: default_openai_temperature(),
        }
    }
}

/// Claude messages request settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeConfig {
    /// Maximum number of tokens to generate
    #[serde(default = "default_claude_max_tokens")]
    pub max_tokens: u32,

    /// Value of the `anthropic-version` header
    #[serde(default = "default_anthropic_version")]
    pub anthropic_version: String,
}

impl Default for ClaudeConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_claude_max_tokens(),
            anthropic_version: default_anthropic_version(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// File name looked up during discovery
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Longest accepted call deadline, one day
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

fn default_timeout_secs() -> u64 {
    30
}

fn default_input_file_limit_kb() -> usize {
    512
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_claude_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta/models".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_claude_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_rewrite_prompt() -> String {
    "Rewrite the following text to improve clarity, grammar and flow while keeping its meaning. Reply with the rewritten text only:".to_string()
}

fn default_translate_prompt() -> String {
    "Translate the following text into {target_language}. Reply with the translation only:".to_string()
}

fn default_summarize_prompt() -> String {
    "Summarize the following text in a few concise sentences:".to_string()
}

fn default_openai_system_prompt() -> String {
    "You are a concise assistant.".to_string()
}

fn default_openai_temperature() -> f32 {
    1.0
}

fn default_claude_max_tokens() -> u32 {
    1024
}

fn default_anthropic_version() -> String {
    "2023-06-01".to_string()
}

impl Config {
    /// Parse a configuration from YAML text and validate it
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AppError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the configuration file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&yaml)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Locations searched for `config.yaml`, in priority order:
    /// next to the executable, the working directory, then the user config dir
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                paths.push(dir.join(CONFIG_FILE_NAME));
            }
        }

        paths.push(PathBuf::from(CONFIG_FILE_NAME));

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("textai").join(CONFIG_FILE_NAME));
        }

        paths
    }

    /// Resolve the configuration for this run
    ///
    /// An explicit path must exist. Otherwise the first discovered file wins,
    /// and built-in defaults are used when none is found.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), AppError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        for candidate in Self::candidate_paths() {
            if candidate.is_file() {
                debug!("Loading configuration from {}", candidate.display());
                let config = Self::load(&candidate)?;
                return Ok((config, Some(candidate)));
            }
            debug!("No configuration at {}", candidate.display());
        }

        warn!("No {} found, using built-in defaults", CONFIG_FILE_NAME);
        Ok((Self::default(), None))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), AppError> {
        if self.http_timeout_seconds == 0 {
            return Err(AppError::Config("httpTimeoutSeconds must be greater than zero".to_string()));
        }

        if self.http_timeout_seconds > MAX_TIMEOUT_SECS {
            return Err(AppError::Config(format!(
                "httpTimeoutSeconds must be at most {} (got {})",
                MAX_TIMEOUT_SECS, self.http_timeout_seconds
            )));
        }

        if self.input_file_limit_kb == 0 {
            return Err(AppError::Config("inputFileLimitKB must be greater than zero".to_string()));
        }

        // Malformed templates are rejected here rather than at call time
        PromptTemplates::from_config(&self.prompts)?;

        for kind in ProviderKind::ALL {
            let endpoint = self.base_endpoints.for_provider(kind);
            url::Url::parse(endpoint).map_err(|e| {
                AppError::Config(format!("Invalid {} endpoint '{}': {}", kind, endpoint, e))
            })?;

            if self.models.for_provider(kind).trim().is_empty() {
                return Err(AppError::Config(format!("Model for {} must not be empty", kind)));
            }
        }

        if self.claude.max_tokens == 0 {
            return Err(AppError::Config("claude.maxTokens must be greater than zero".to_string()));
        }

        Ok(())
    }

    /// Deadline applied to each backend call
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_seconds)
    }

    /// Build the settings for one backend
    pub fn provider_config(&self, kind: ProviderKind, api_key: impl Into<String>) -> ProviderConfig {
        ProviderConfig {
            kind,
            model: self.models.for_provider(kind).to_string(),
            endpoint: self.base_endpoints.for_provider(kind).to_string(),
            api_key: api_key.into(),
        }
    }

    /// Validated prompt templates
    pub fn prompt_templates(&self) -> Result<PromptTemplates, AppError> {
        PromptTemplates::from_config(&self.prompts)
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            http_timeout_seconds: default_timeout_secs(),
            input_file_limit_kb: default_input_file_limit_kb(),
            log_level: LogLevel::default(),
            models: ModelsConfig::default(),
            prompts: PromptsConfig::default(),
            base_endpoints: EndpointsConfig::default(),
            openai: OpenAIConfig::default(),
            claude: ClaudeConfig::default(),
        }
    }
}
