//! Prompt construction.
//!
//! Builders are pure: they embed the statement text verbatim and never trim
//! it. Budgeting happens before a prompt is built.

use crate::session::Conversation;

/// Persona for the summary and advice turn.
pub const ADVICE_SYSTEM_PROMPT: &str = "You are a financial advisor. Analyze the following bank \
statement text and provide a summary of expenses, deposits, fixed and unfixed costs. Then, offer \
tailored financial advice and ask if the user has any follow-up questions.";

/// Prefix placed before the statement text in the advice request.
pub const ADVICE_USER_PREFIX: &str = "Please analyze the following bank statements:\n\n";

/// Persona for the expense extraction turn.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a helpful financial assistant.";

/// Instruction placed before the statement text in the extraction request.
pub const EXTRACTION_USER_PREFIX: &str = "Extract categorized expenses from this bank statement. \
Return only a valid JSON object with category names as keys and total expenses as values. \
Do NOT include markdown, explanations, or code formatting.\n\n";

/// Persona for a follow-up asked without any prior history.
pub const FOLLOWUP_SYSTEM_PROMPT: &str = "You are a helpful financial advisor.";

/// Build the two-message summary and advice prompt.
///
/// # Example
/// ```
/// use finsight::advisor::build_advice_prompt;
/// use finsight::session::Role;
///
/// let conv = build_advice_prompt("01/02 GROCERY -54.20");
/// assert_eq!(conv.len(), 2);
/// assert_eq!(conv.messages()[0].role, Role::System);
/// assert!(conv.messages()[1].content.ends_with("01/02 GROCERY -54.20"));
/// ```
pub fn build_advice_prompt(source_text: &str) -> Conversation {
    Conversation::start(ADVICE_SYSTEM_PROMPT)
        .append_user(&format!("{}{}", ADVICE_USER_PREFIX, source_text))
}

/// Build the two-message expense extraction prompt.
pub fn build_extraction_prompt(source_text: &str) -> Conversation {
    Conversation::start(EXTRACTION_SYSTEM_PROMPT)
        .append_user(&format!("{}{}", EXTRACTION_USER_PREFIX, source_text))
}

/// Build a fresh follow-up prompt for a question with no history behind it.
pub fn build_followup_prompt(question: &str) -> Conversation {
    Conversation::start(FOLLOWUP_SYSTEM_PROMPT).append_user(question)
}
