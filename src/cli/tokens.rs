//! Token count command handler.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;

use finsight::advisor::count_tokens;

use super::common::load_config;
use super::GlobalArgs;

/// Print `{"tokens": N}` for a file or stdin.
///
/// `--model` selects the tokenizer; the configured budget tokenizer is the default.
pub(crate) fn cmd_tokens(globals: &GlobalArgs, source: Option<PathBuf>) -> Result<()> {
    let text = match &source {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let model = match &globals.model {
        Some(model) => model.clone(),
        None => load_config(globals)?.budget.tokenizer_model,
    };

    let tokens = count_tokens(&text, &model)?;
    println!("{}", json!({ "tokens": tokens }));
    Ok(())
}
