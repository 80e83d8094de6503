//! Configuration types for Finsight

use serde::{Deserialize, Serialize};

use crate::advisor::NumericMode;

/// Main configuration struct for Finsight
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LLM provider settings
    pub provider: ProviderConfig,
    /// Token budget for statement text
    pub budget: BudgetConfig,
    /// Reply extraction settings
    pub extraction: ExtractionConfig,
    /// HTTP server settings
    pub server: ServerConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// OpenAI-compatible provider configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Default API key, used when a request does not carry its own
    pub api_key: Option<String>,
    /// Base URL override (e.g. a proxy or compatible endpoint)
    pub api_base: Option<String>,
    /// Chat model name
    pub model: String,
    /// Deadline for a single LLM call, in seconds
    pub timeout_secs: u64,
    /// Sampling temperature; the backend default applies when unset
    pub temperature: Option<f32>,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            temperature: None,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

// ============================================================================
// Budget / Extraction Configuration
// ============================================================================

/// Token budget applied to statement text before prompting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Maximum statement tokens per prompt
    pub max_input_tokens: usize,
    /// Model whose tokenizer is used for counting
    pub tokenizer_model: String,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_input_tokens: crate::advisor::DEFAULT_MAX_INPUT_TOKENS,
            tokenizer_model: crate::advisor::DEFAULT_TOKENIZER_MODEL.to_string(),
        }
    }
}

/// Reply extraction settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Whether numeric strings count as amounts
    pub numeric_mode: NumericMode,
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5050
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

// ============================================================================
// Logging Configuration
// ============================================================================

/// Output format of log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, human-readable
    Pretty,
    /// One compact line per event, with `component` fields
    #[default]
    Component,
    /// JSON lines
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "component" => Ok(LogFormat::Component),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Output format
    pub format: LogFormat,
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Append log lines to this file instead of stderr
    pub file: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_level(),
            file: None,
        }
    }
}
