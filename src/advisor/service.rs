//! The advisor: sequences budgeting, prompting, the LLM call and extraction
//! for each user-facing operation.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{
    build_advice_prompt, build_extraction_prompt, build_followup_prompt, extract_expenses,
    ExpenseMap, NumericMode, TokenBudgeter, ADVICE_USER_PREFIX, DEFAULT_MAX_INPUT_TOKENS,
    DEFAULT_TOKENIZER_MODEL, EXTRACTION_USER_PREFIX,
};
use crate::config::Config;
use crate::error::{FinsightError, ProviderError, Result};
use crate::log_component;
use crate::providers::{ChatOptions, Credentials, LLMProvider, OpenAIProvider};
use crate::session::{Conversation, Message};
use crate::utils::string::preview;

/// Free-form summary and advice text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinancialSummary(String);

impl FinancialSummary {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Whether there is anything to display.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for FinancialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Runtime settings of an [`Advisor`].
#[derive(Debug, Clone)]
pub struct AdvisorSettings {
    /// Chat model name
    pub model: String,
    /// Statement token ceiling
    pub max_input_tokens: usize,
    /// Model whose tokenizer measures the ceiling
    pub tokenizer_model: String,
    /// Deadline for one LLM call
    pub timeout: Duration,
    /// Which reply values count as amounts
    pub numeric_mode: NumericMode,
    /// Sampling temperature, if overridden
    pub temperature: Option<f32>,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            tokenizer_model: DEFAULT_TOKENIZER_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            numeric_mode: NumericMode::default(),
            temperature: None,
        }
    }
}

impl AdvisorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.provider.model.clone(),
            max_input_tokens: config.budget.max_input_tokens,
            tokenizer_model: config.budget.tokenizer_model.clone(),
            timeout: config.timeout(),
            numeric_mode: config.extraction.numeric_mode,
            temperature: config.provider.temperature,
        }
    }
}

/// Runs summary, expense extraction and follow-up operations.
///
/// An `Advisor` holds no per-user state: credentials arrive with each call
/// and conversations are passed in and handed back. Share it behind `Arc`.
pub struct Advisor {
    provider: Arc<dyn LLMProvider>,
    budgeter: TokenBudgeter,
    settings: AdvisorSettings,
}

impl fmt::Debug for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advisor")
            .field("provider", &self.provider.name())
            .field("budgeter", &self.budgeter)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Advisor {
    /// Create an advisor over any chat provider.
    ///
    /// Fails with a configuration error for an unknown tokenizer model or a
    /// zero budget.
    pub fn new(provider: Arc<dyn LLMProvider>, settings: AdvisorSettings) -> Result<Self> {
        if settings.max_input_tokens == 0 {
            return Err(FinsightError::Config(
                "max_input_tokens must be greater than zero".to_string(),
            ));
        }
        let budgeter =
            TokenBudgeter::for_model(&settings.tokenizer_model, settings.max_input_tokens)?;
        Ok(Self {
            provider,
            budgeter,
            settings,
        })
    }

    /// Create an advisor talking to the OpenAI endpoint named in `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = match &config.provider.api_base {
            Some(base) => OpenAIProvider::with_base_url(base),
            None => OpenAIProvider::new(),
        };
        Self::new(Arc::new(provider), AdvisorSettings::from_config(config))
    }

    pub fn settings(&self) -> &AdvisorSettings {
        &self.settings
    }

    pub fn budgeter(&self) -> &TokenBudgeter {
        &self.budgeter
    }

    /// Summarize a statement and return the conversation to continue from.
    ///
    /// The returned conversation holds the advice prompt followed by the
    /// assistant's summary.
    pub async fn begin_session(
        &self,
        text: &str,
        credentials: &Credentials,
    ) -> Result<(FinancialSummary, Conversation)> {
        require_text(text, "statement text")?;
        require_credentials(credentials)?;

        let statement = self.fit_to_budget(text, "statement");
        let prompt = build_advice_prompt(&statement);
        let reply = self.complete(&prompt, credentials).await?;

        if reply.trim().is_empty() {
            log_component!(warn, "advisor", "model returned an empty summary");
        }

        let conversation = prompt.append_assistant(&reply);
        Ok((FinancialSummary(reply), conversation))
    }

    /// Summarize a statement and offer advice.
    pub async fn produce_summary(
        &self,
        text: &str,
        credentials: &Credentials,
    ) -> Result<FinancialSummary> {
        let (summary, _) = self.begin_session(text, credentials).await?;
        Ok(summary)
    }

    /// Ask the model for categorized expenses and parse its reply.
    pub async fn produce_expense_breakdown(
        &self,
        text: &str,
        credentials: &Credentials,
    ) -> Result<ExpenseMap> {
        require_text(text, "statement text")?;
        require_credentials(credentials)?;

        let statement = self.fit_to_budget(text, "statement");
        let prompt = build_extraction_prompt(&statement);
        let reply = self.complete(&prompt, credentials).await?;

        let expenses = extract_expenses(&reply, self.settings.numeric_mode).map_err(|e| {
            log_component!(
                warn,
                "advisor",
                "could not parse expense reply",
                reason = e.to_string().as_str(),
                reply = preview(&reply, 100).as_str()
            );
            e
        })?;

        log_component!(
            info,
            "advisor",
            "expense breakdown ready",
            categories = expenses.len()
        );
        Ok(expenses)
    }

    /// Answer a follow-up question against the full prior conversation.
    ///
    /// Returns the reply and the conversation extended with the question and
    /// the reply. On failure the caller's conversation is untouched.
    ///
    /// The question and every replayed message are held to the token budget.
    /// Statement prompts are measured without their fixed prefix, so history
    /// produced by this advisor replays unchanged.
    pub async fn answer_followup(
        &self,
        conversation: &Conversation,
        question: &str,
        credentials: &Credentials,
    ) -> Result<(String, Conversation)> {
        let question = question.trim();
        require_text(question, "question")?;
        require_credentials(credentials)?;

        let question = self.fit_to_budget(question, "question");
        let request = if conversation.is_empty() {
            build_followup_prompt(&question)
        } else {
            self.fit_history(conversation).append_user(&question)
        };

        let reply = self.complete(&request, credentials).await?;
        let extended = request.append_assistant(&reply);
        Ok((reply, extended))
    }

    fn fit_to_budget<'a>(&self, text: &'a str, what: &str) -> std::borrow::Cow<'a, str> {
        let trimmed = self.budgeter.trim(text);
        if trimmed.len() < text.len() {
            log_component!(
                info,
                "advisor",
                "input trimmed to token budget",
                input = what,
                max_tokens = self.budgeter.max_tokens(),
                original_chars = text.chars().count(),
                kept_chars = trimmed.chars().count()
            );
        }
        trimmed
    }

    /// Copy of a replayed conversation with each message held to the budget.
    fn fit_history(&self, conversation: &Conversation) -> Conversation {
        let messages = conversation
            .messages()
            .iter()
            .map(|message| {
                let content = &message.content;
                let content = [ADVICE_USER_PREFIX, EXTRACTION_USER_PREFIX]
                    .iter()
                    .find_map(|prefix| {
                        content.strip_prefix(*prefix).map(|body| {
                            format!("{}{}", prefix, self.fit_to_budget(body, "history"))
                        })
                    })
                    .unwrap_or_else(|| self.fit_to_budget(content, "history").into_owned());
                Message {
                    role: message.role,
                    content,
                }
            })
            .collect();
        Conversation::from_messages(messages)
    }

    async fn complete(
        &self,
        conversation: &Conversation,
        credentials: &Credentials,
    ) -> Result<String> {
        let mut options = ChatOptions::new();
        if let Some(t) = self.settings.temperature {
            options = options.with_temperature(t);
        }

        log_component!(
            debug,
            "advisor",
            "calling model",
            provider = self.provider.name(),
            model = self.settings.model.as_str(),
            messages = conversation.len()
        );

        let call = self.provider.chat(
            conversation.to_message_list(),
            &self.settings.model,
            credentials,
            options,
        );
        let response = match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                log_component!(
                    warn,
                    "advisor",
                    "model call timed out",
                    timeout_secs = self.settings.timeout.as_secs_f64()
                );
                return Err(ProviderError::Timeout(format!(
                    "no reply within {:?}",
                    self.settings.timeout
                ))
                .into());
            }
        };

        log_component!(
            debug,
            "advisor",
            "model replied",
            reply = preview(&response.content, 100).as_str()
        );
        Ok(response.content)
    }
}

fn require_text(text: &str, what: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(FinsightError::MissingInput(format!("{} is empty", what)));
    }
    Ok(())
}

fn require_credentials(credentials: &Credentials) -> Result<()> {
    if credentials.is_empty() {
        return Err(FinsightError::MissingInput("API key is required".to_string()));
    }
    Ok(())
}
