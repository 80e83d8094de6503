//! Advisor module - statement analysis on top of a chat model
//!
//! - [`budget`]: token counting and trimming of statement text
//! - [`prompts`]: prompt builders for summary, extraction and follow-up turns
//! - [`extractor`]: parsing an expense object out of a free-form reply
//! - [`service`]: the [`Advisor`] that sequences the above around the LLM call

pub mod budget;
mod expenses;
pub mod extractor;
pub mod prompts;
mod service;

pub use budget::{
    count_tokens, trim_to_token_limit, TokenBudgeter, DEFAULT_MAX_INPUT_TOKENS,
    DEFAULT_TOKENIZER_MODEL,
};
pub use expenses::ExpenseMap;
pub use extractor::{extract_expenses, find_json_span, ExtractionFailure, NumericMode};
pub use prompts::{
    build_advice_prompt, build_extraction_prompt, build_followup_prompt, ADVICE_SYSTEM_PROMPT,
    ADVICE_USER_PREFIX, EXTRACTION_SYSTEM_PROMPT, EXTRACTION_USER_PREFIX, FOLLOWUP_SYSTEM_PROMPT,
};
pub use service::{Advisor, AdvisorSettings, FinancialSummary};
