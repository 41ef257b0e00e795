//! Configuration loading from tether.toml.

use runtime::{COHERE_API_URL, Interpreters, SamplingParams, SessionOptions};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const API_KEY_ENV: &str = "COHERE_API_KEY";
const MODEL_ENV: &str = "TETHER_MODEL";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub sampling: SamplingParams,
    pub tools: ToolsConfig,
}

/// Backend provider configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Provider name (currently only "cohere" supported).
    pub provider: String,

    /// Model to use.
    pub model: String,

    /// Chat endpoint URL.
    pub endpoint: String,

    /// API key. Falls back to the COHERE_API_KEY environment variable.
    pub api_key: Option<String>,

    /// Bound on a single model call, in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: "cohere".to_string(),
            model: "command-r-plus".to_string(),
            endpoint: COHERE_API_URL.to_string(),
            api_key: None,
            timeout_secs: 240,
        }
    }
}

/// Tool server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub connect_timeout_secs: u64,
    pub call_timeout_secs: u64,

    /// How many model calls per query may be offered tools.
    pub max_tool_rounds: usize,

    #[serde(flatten)]
    pub interpreters: Interpreters,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        let session = SessionOptions::default();
        Self {
            connect_timeout_secs: session.connect_timeout.as_secs(),
            call_timeout_secs: session.call_timeout.as_secs(),
            max_tool_rounds: session.max_tool_rounds,
            interpreters: Interpreters::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.provider != "cohere" {
            return Err(ConfigError::UnsupportedProvider(self.backend.provider.clone()));
        }
        Ok(())
    }

    /// Apply environment overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(model) = std::env::var(MODEL_ENV) {
            self.backend.model = model;
        }
        if self.backend.api_key.is_none() {
            self.backend.api_key = std::env::var(API_KEY_ENV).ok();
        }
        self
    }

    /// The API key, which must be configured.
    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.backend
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            connect_timeout: Duration::from_secs(self.tools.connect_timeout_secs),
            call_timeout: Duration::from_secs(self.tools.call_timeout_secs),
            max_tool_rounds: self.tools.max_tool_rounds,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("unsupported provider `{0}` (only \"cohere\" is available)")]
    UnsupportedProvider(String),

    #[error("API key not configured: set backend.api_key or COHERE_API_KEY")]
    MissingApiKey,
}
