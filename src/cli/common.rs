//! Shared CLI helpers used across multiple command handlers.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use finsight::config::Config;
use finsight::documents::{extract_text, AutoExtractor, Document};
use finsight::providers::Credentials;

use super::GlobalArgs;

/// Load config from `--config` or the default path, then apply CLI overrides.
pub(crate) fn load_config(globals: &GlobalArgs) -> Result<Config> {
    let mut config = match &globals.config {
        Some(path) => Config::load_from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().with_context(|| "Failed to load config")?,
    };

    if let Some(key) = &globals.api_key {
        config.provider.api_key = Some(key.clone());
    }
    if let Some(model) = &globals.model {
        config.provider.model = model.clone();
    }
    Ok(config)
}

/// Credentials from `--api-key`, the environment, or the config file.
pub(crate) fn credentials(config: &Config) -> Result<Credentials> {
    config.credentials().with_context(|| {
        "No API key configured. Pass --api-key, set FINSIGHT_OPENAI_API_KEY, \
         or add provider.api_key to the config file"
    })
}

/// Read statement files and extract their text.
pub(crate) async fn statement_text(files: Vec<PathBuf>) -> Result<String> {
    tokio::task::spawn_blocking(move || -> Result<String> {
        let documents = files
            .iter()
            .map(|path| Document::from_path(path))
            .collect::<finsight::Result<Vec<_>>>()?;
        Ok(extract_text(&AutoExtractor, &documents)?)
    })
    .await
    .context("Text extraction task failed")?
}

/// Print a prompt and read a line from stdin, trimming whitespace.
///
/// Returns `None` at end of input.
pub(crate) fn prompt_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut input)
        .with_context(|| "Failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim().to_string()))
}
