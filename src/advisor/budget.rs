//! Token budgeting for LLM prompts.
//!
//! Statement text is trimmed client-side, at a token boundary, before it is
//! embedded in a prompt. Token counts come from the BPE tokenizer of the
//! named model family (`tiktoken-rs`), so a budget is always tied to a model
//! name.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;
use tracing::debug;

use crate::error::{FinsightError, Result};

/// Default ceiling on statement tokens sent in one prompt.
pub const DEFAULT_MAX_INPUT_TOKENS: usize = 13_000;

/// Default model whose tokenizer is used for budgeting.
pub const DEFAULT_TOKENIZER_MODEL: &str = "gpt-4";

/// Loaded tokenizers keyed by model name. Building a BPE table is expensive.
static TOKENIZERS: Lazy<Mutex<HashMap<String, Arc<CoreBPE>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn tokenizer_for(model: &str) -> Result<Arc<CoreBPE>> {
    let mut cache = TOKENIZERS
        .lock()
        .map_err(|_| FinsightError::Config("tokenizer cache poisoned".to_string()))?;

    if let Some(bpe) = cache.get(model) {
        return Ok(Arc::clone(bpe));
    }

    let bpe = tiktoken_rs::get_bpe_from_model(model).map_err(|e| {
        FinsightError::Config(format!("unknown tokenizer model '{}': {}", model, e))
    })?;
    let bpe = Arc::new(bpe);
    cache.insert(model.to_string(), Arc::clone(&bpe));
    Ok(bpe)
}

/// A token budget bound to one model's tokenizer.
#[derive(Clone)]
pub struct TokenBudgeter {
    model: String,
    max_tokens: usize,
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for TokenBudgeter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBudgeter")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl TokenBudgeter {
    /// Bind a budget of `max_tokens` to the tokenizer of `model`.
    ///
    /// Fails with a configuration error when the model is unknown.
    ///
    /// # Example
    /// ```
    /// use finsight::advisor::TokenBudgeter;
    ///
    /// let budgeter = TokenBudgeter::for_model("gpt-4", 5).unwrap();
    /// let trimmed = budgeter.trim("one two three four five six seven eight");
    /// assert!(budgeter.count(&trimmed) <= 5);
    /// assert!(TokenBudgeter::for_model("no-such-model", 5).is_err());
    /// ```
    pub fn for_model(model: &str, max_tokens: usize) -> Result<Self> {
        Ok(Self {
            model: model.to_string(),
            max_tokens,
            bpe: tokenizer_for(model)?,
        })
    }

    /// Model whose tokenizer this budget uses.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The configured ceiling.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Number of tokens `text` encodes to.
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Whether `text` already fits the configured ceiling.
    pub fn fits(&self, text: &str) -> bool {
        self.count(text) <= self.max_tokens
    }

    /// Trim `text` to the configured ceiling.
    pub fn trim<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.trim_to(text, self.max_tokens)
    }

    /// Trim `text` to at most `max_tokens` tokens.
    ///
    /// Text that already fits is returned borrowed and unchanged. Otherwise
    /// the result is the longest decodable token prefix whose own token count
    /// is within the limit, which makes trimming idempotent.
    pub fn trim_to<'a>(&self, text: &'a str, max_tokens: usize) -> Cow<'a, str> {
        let tokens = self.bpe.encode_with_special_tokens(text);
        if tokens.len() <= max_tokens {
            return Cow::Borrowed(text);
        }

        let mut cut = max_tokens;
        while cut > 0 {
            // A cut inside a multi-byte character does not decode; step back.
            if let Ok(prefix) = self.bpe.decode(tokens[..cut].to_vec()) {
                if self.count(&prefix) <= max_tokens {
                    debug!(
                        model = %self.model,
                        from_tokens = tokens.len(),
                        to_tokens = cut,
                        "trimmed text to token budget"
                    );
                    return Cow::Owned(prefix);
                }
            }
            cut -= 1;
        }

        Cow::Owned(String::new())
    }
}

/// Count the tokens of `text` under `model`'s tokenizer.
///
/// # Example
/// ```
/// use finsight::advisor::count_tokens;
///
/// assert_eq!(count_tokens("", "gpt-4").unwrap(), 0);
/// assert!(count_tokens("This is a test.", "gpt-4").unwrap() > 0);
/// ```
pub fn count_tokens(text: &str, model: &str) -> Result<usize> {
    Ok(TokenBudgeter::for_model(model, 0)?.count(text))
}

/// Trim `text` to at most `max_tokens` tokens under `model`'s tokenizer.
pub fn trim_to_token_limit(text: &str, max_tokens: usize, model: &str) -> Result<String> {
    let budgeter = TokenBudgeter::for_model(model, max_tokens)?;
    Ok(budgeter.trim(text).into_owned())
}
