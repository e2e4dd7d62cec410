//! Configuration loading, validation, and management for SousChef.
//!
//! Loads configuration from `~/.souschef/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup,
//! before any turn is processed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Built-in system instruction sent as the first message of every request.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are SousChef, a friendly and practical cooking assistant.

You can:
- Search recipes with filters (dietary restrictions, cuisine, cooking time, difficulty)
- Extract ingredients, quantities, and dietary constraints from free text
- Recommend dishes based on what the user has and what they prefer
- Suggest substitutions and answer general cooking questions

When talking with users:
- Be warm and concise; give actionable answers
- Ask a clarifying question when a request is ambiguous
- Respect the user context you are given (diet, time, skill, servings)
- Use the ingredient_extractor tool when the user lists ingredients or pastes a recipe
- Use the recipe_search tool when the user wants recipe suggestions
- Answer directly, without tools, for general tips and follow-ups";

/// The root configuration structure.
///
/// Maps directly to `~/.souschef/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the model endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Provider flavour: "azure", "openai", "openrouter", "ollama", or any
    /// OpenAI-compatible name with an explicit `api_url`
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model name (deployment name for Azure)
    #[serde(default = "default_model")]
    pub model: String,

    /// Endpoint base URL (required for Azure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Azure OpenAI API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub agent: AgentSettings,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_provider() -> String {
    "azure".into()
}
fn default_model() -> String {
    "gpt-4".into()
}
fn default_api_version() -> String {
    "2024-08-01-preview".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_true() -> bool {
    true
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("agent", &self.agent)
            .field("memory", &self.memory)
            .field("tools", &self.tools)
            .field("logging", &self.logging)
            .finish()
    }
}

/// Orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Orchestrator backend: "managed"
    #[serde(default = "default_orchestrator")]
    pub orchestrator: String,

    /// Turns (user/assistant pairs) kept in history
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    /// Run a turn's tool calls concurrently (results keep request order)
    #[serde(default)]
    pub parallel_tool_calls: bool,

    /// Override the built-in system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_orchestrator() -> String {
    "managed".into()
}
fn default_max_history_turns() -> usize {
    10
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            orchestrator: default_orchestrator(),
            max_history_turns: default_max_history_turns(),
            parallel_tool_calls: false,
            system_prompt: None,
        }
    }
}

impl AgentSettings {
    /// The system prompt in effect (override or built-in).
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Memory backend: "in_memory"
    #[serde(default = "default_memory_backend")]
    pub backend: String,
}

fn default_memory_backend() -> String {
    "in_memory".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_true")]
    pub ingredient_extractor: bool,

    #[serde(default = "default_true")]
    pub recipe_search: bool,

    #[serde(default = "default_max_recipe_results")]
    pub max_recipe_results: usize,

    #[serde(default = "default_recipe_data_path")]
    pub recipe_data_path: PathBuf,

    /// Ask the model to extract ingredients when the patterns find none
    #[serde(default = "default_true")]
    pub llm_fallback: bool,
}

fn default_max_recipe_results() -> usize {
    5
}
fn default_recipe_data_path() -> PathBuf {
    PathBuf::from("data/recipes.json")
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ingredient_extractor: true,
            recipe_search: true,
            max_recipe_results: default_max_recipe_results(),
            recipe_data_path: default_recipe_data_path(),
            llm_fallback: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Also write logs to this file; stderr output continues either way
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,

    /// Log every turn's input, tools, rationale and results
    #[serde(default = "default_true")]
    pub detailed_interactions: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            json: false,
            detailed_interactions: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.souschef/config.toml),
    /// then apply environment overrides.
    ///
    /// API key lookup order when the file has none:
    /// - `SOUSCHEF_API_KEY`
    /// - `AZURE_OPENAI_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_overrides(&Self::config_dir().join("config.toml"))
    }

    /// Load from a specific path, then apply environment overrides.
    pub fn load_with_overrides(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = lookup("SOUSCHEF_API_KEY")
                .or_else(|| lookup("AZURE_OPENAI_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(endpoint) = lookup("AZURE_OPENAI_ENDPOINT") {
            self.api_url = Some(endpoint);
            self.provider = "azure".into();
        }

        if let Some(provider) = lookup("SOUSCHEF_PROVIDER") {
            self.provider = provider;
        }

        if let Some(model) = lookup("MODEL_DEPLOYMENT_NAME").or_else(|| lookup("SOUSCHEF_MODEL")) {
            self.model = model;
        }

        if let Some(version) = lookup("API_VERSION") {
            self.api_version = version;
        }

        if let Some(kind) = lookup("ORCHESTRATOR_TYPE") {
            self.agent.orchestrator = kind;
        }

        if let Some(backend) = lookup("MEMORY_BACKEND") {
            self.memory.backend = backend;
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }

        if let Some(flag) = lookup("ENABLE_DETAILED_LOGGING") {
            self.logging.detailed_interactions = flag.eq_ignore_ascii_case("true");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".souschef")
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.temperature < 0.0 || self.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "max_tokens must be > 0".into(),
            ));
        }

        if self.agent.max_history_turns == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_history_turns must be > 0".into(),
            ));
        }

        if self.tools.max_recipe_results == 0 {
            return Err(ConfigError::ValidationError(
                "tools.max_recipe_results must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check that the model endpoint can be reached with what we have.
    ///
    /// Called once at startup; a failure here is fatal.
    pub fn validate_credentials(&self) -> Result<(), ConfigError> {
        let needs_key = self.provider != "ollama";
        if needs_key && self.api_key.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingCredential(
                "api_key (set SOUSCHEF_API_KEY, AZURE_OPENAI_API_KEY or OPENAI_API_KEY)".into(),
            ));
        }

        if self.provider == "azure" && self.api_url.as_deref().is_none_or(str::is_empty) {
            return Err(ConfigError::MissingCredential(
                "api_url (set AZURE_OPENAI_ENDPOINT)".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for the `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Write the default configuration to `path`, creating parent dirs.
    pub fn write_default(path: &Path) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        std::fs::write(path, Self::default_toml()).map_err(write_err)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: default_provider(),
            model: default_model(),
            api_url: None,
            api_version: default_api_version(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            agent: AgentSettings::default(),
            memory: MemoryConfig::default(),
            tools: ToolsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to write config file at {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required credential: {0}")]
    MissingCredential(String),
}
