//! Configuration management for Finsight
//!
//! Configuration is loaded from `~/.finsight/config.json` (or an explicit
//! path), falls back to defaults when the file is absent, and is then
//! overridden by `FINSIGHT_*` environment variables.

mod types;
pub mod validate;

pub use types::*;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::advisor::TokenBudgeter;
use crate::error::{FinsightError, Result};
use crate::providers::Credentials;

impl Config {
    /// Returns the Finsight configuration directory path (~/.finsight)
    pub fn dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".finsight")
    }

    /// Returns the path to the config file (~/.finsight/config.json)
    pub fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load configuration from the default path with environment overrides.
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::path())
    }

    /// Load configuration from a specific path with environment overrides.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                FinsightError::Config(format!("failed to parse {}: {}", path.display(), e))
            })?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply `FINSIGHT_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Values that fail to parse are skipped with a warning.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        fn parsed<T: std::str::FromStr>(key: &str, val: String) -> Option<T> {
            match val.trim().parse() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(key, value = %val, "ignoring unparsable environment override");
                    None
                }
            }
        }

        // Provider
        if let Some(val) = lookup("FINSIGHT_OPENAI_API_KEY") {
            if !val.trim().is_empty() {
                self.provider.api_key = Some(val);
            }
        }
        if let Some(val) = lookup("FINSIGHT_OPENAI_API_BASE") {
            if !val.trim().is_empty() {
                self.provider.api_base = Some(val);
            }
        }
        if let Some(val) = lookup("FINSIGHT_MODEL") {
            self.provider.model = val;
        }
        if let Some(val) = lookup("FINSIGHT_TIMEOUT_SECS") {
            if let Some(v) = parsed("FINSIGHT_TIMEOUT_SECS", val) {
                self.provider.timeout_secs = v;
            }
        }

        // Budget
        if let Some(val) = lookup("FINSIGHT_BUDGET_MAX_INPUT_TOKENS") {
            if let Some(v) = parsed("FINSIGHT_BUDGET_MAX_INPUT_TOKENS", val) {
                self.budget.max_input_tokens = v;
            }
        }
        if let Some(val) = lookup("FINSIGHT_BUDGET_TOKENIZER_MODEL") {
            self.budget.tokenizer_model = val;
        }

        // Extraction
        if let Some(val) = lookup("FINSIGHT_EXTRACTION_NUMERIC_MODE") {
            if let Some(v) = parsed("FINSIGHT_EXTRACTION_NUMERIC_MODE", val) {
                self.extraction.numeric_mode = v;
            }
        }

        // Server
        if let Some(val) = lookup("FINSIGHT_SERVER_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("FINSIGHT_SERVER_PORT") {
            if let Some(v) = parsed("FINSIGHT_SERVER_PORT", val) {
                self.server.port = v;
            }
        }

        // Logging
        if let Some(val) = lookup("FINSIGHT_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("FINSIGHT_LOG_FORMAT") {
            if let Some(v) = parsed("FINSIGHT_LOG_FORMAT", val) {
                self.logging.format = v;
            }
        }
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the advisor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.budget.max_input_tokens == 0 {
            return Err(FinsightError::Config(
                "budget.max_input_tokens must be greater than zero".to_string(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(FinsightError::Config(
                "provider.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.provider.model.trim().is_empty() {
            return Err(FinsightError::Config(
                "provider.model must not be empty".to_string(),
            ));
        }
        if self.budget.tokenizer_model.trim().is_empty() {
            return Err(FinsightError::Config(
                "budget.tokenizer_model must not be empty".to_string(),
            ));
        }
        TokenBudgeter::for_model(&self.budget.tokenizer_model, self.budget.max_input_tokens)?;
        Ok(())
    }

    /// Deadline for one LLM call.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    /// Default credentials from config, if a non-blank key is set.
    pub fn credentials(&self) -> Option<Credentials> {
        self.provider
            .api_key
            .as_deref()
            .map(Credentials::new)
            .filter(|c| !c.is_empty())
    }
}
