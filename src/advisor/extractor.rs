//! Reply extraction: turn a free-form LLM reply into an [`ExpenseMap`].
//!
//! The model is asked for a bare JSON object but often wraps it in prose or
//! code fences. The first `{ ... }` span (minimal match) is taken as the
//! candidate object; nested objects are not supported.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::ExpenseMap;

/// First `{` to the first `}` after it, across newlines.
static JSON_SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*?\}").unwrap());

/// Why a reply could not be turned into an expense map.
///
/// Both variants keep the raw text so a caller can show it to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The reply contains no `{ ... }` span at all
    #[error("No JSON object found in model reply")]
    NoJsonFound { reply: String },

    /// The span was found but is not a valid JSON object
    #[error("Invalid JSON in model reply: {reason}")]
    InvalidJson { span: String, reason: String },
}

impl ExtractionFailure {
    /// The raw model output worth showing: the span when one was found,
    /// otherwise the whole reply.
    pub fn raw(&self) -> &str {
        match self {
            ExtractionFailure::NoJsonFound { reply } => reply,
            ExtractionFailure::InvalidJson { span, .. } => span,
        }
    }
}

/// Which JSON values count as amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericMode {
    /// JSON numbers, and strings holding a finite number
    #[default]
    Lenient,
    /// JSON numbers only
    Strict,
}

impl FromStr for NumericMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(NumericMode::Lenient),
            "strict" => Ok(NumericMode::Strict),
            other => Err(format!(
                "unknown numeric mode '{}' (expected 'lenient' or 'strict')",
                other
            )),
        }
    }
}

impl std::fmt::Display for NumericMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericMode::Lenient => write!(f, "lenient"),
            NumericMode::Strict => write!(f, "strict"),
        }
    }
}

/// Locate the candidate JSON span in a reply.
pub fn find_json_span(reply: &str) -> Option<&str> {
    JSON_SPAN_RE.find(reply).map(|m| m.as_str())
}

fn as_amount(value: &Value, mode: NumericMode) -> Option<f64> {
    let amount = match (value, mode) {
        (Value::Number(n), _) => n.as_f64()?,
        (Value::String(s), NumericMode::Lenient) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    amount.is_finite().then_some(amount)
}

/// Extract a category to amount map from an LLM reply.
///
/// Entries whose value is not a positive number are dropped. An empty map is
/// a valid result.
///
/// # Example
/// ```
/// use finsight::advisor::{extract_expenses, NumericMode};
///
/// let reply = r#"Here you go: {"Food": 200, "Transport": -100, "Entertainment": "50", "Invalid": "abc"}"#;
/// let map = extract_expenses(reply, NumericMode::Lenient).unwrap();
/// assert_eq!(map.len(), 2);
/// assert_eq!(map.get("Food"), Some(200.0));
/// assert_eq!(map.get("Entertainment"), Some(50.0));
/// ```
pub fn extract_expenses(
    reply: &str,
    mode: NumericMode,
) -> std::result::Result<ExpenseMap, ExtractionFailure> {
    let span = find_json_span(reply).ok_or_else(|| ExtractionFailure::NoJsonFound {
        reply: reply.to_string(),
    })?;

    let object = match serde_json::from_str::<Value>(span) {
        Ok(Value::Object(object)) => object,
        Ok(_) => {
            return Err(ExtractionFailure::InvalidJson {
                span: span.to_string(),
                reason: "expected a JSON object".to_string(),
            })
        }
        Err(e) => {
            return Err(ExtractionFailure::InvalidJson {
                span: span.to_string(),
                reason: e.to_string(),
            })
        }
    };

    let mut expenses = ExpenseMap::new();
    let mut dropped = 0usize;
    for (category, value) in object {
        match as_amount(&value, mode) {
            Some(amount) if amount > 0.0 && !category.is_empty() => {
                expenses.insert(category, amount.abs());
            }
            _ => dropped += 1,
        }
    }

    debug!(
        kept = expenses.len(),
        dropped,
        mode = %mode,
        "extracted expense entries"
    );
    Ok(expenses)
}
