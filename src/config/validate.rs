//! Unknown-field detection for raw config files.
//!
//! `serde(default)` silently ignores misspelled keys, so a typo like
//! `"max_input_token"` would leave the default budget in place. These
//! diagnostics surface such keys with a "did you mean" hint.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use crate::error::{FinsightError, Result};

/// Known top-level config field names.
const KNOWN_TOP_LEVEL: &[&str] = &["provider", "budget", "extraction", "server", "logging"];

const KNOWN_PROVIDER: &[&str] = &["api_key", "api_base", "model", "timeout_secs", "temperature"];
const KNOWN_BUDGET: &[&str] = &["max_input_tokens", "tokenizer_model"];
const KNOWN_EXTRACTION: &[&str] = &["numeric_mode"];
const KNOWN_SERVER: &[&str] = &["host", "port"];
const KNOWN_LOGGING: &[&str] = &["format", "level", "file"];

const SECTIONS: &[(&str, &[&str])] = &[
    ("provider", KNOWN_PROVIDER),
    ("budget", KNOWN_BUDGET),
    ("extraction", KNOWN_EXTRACTION),
    ("server", KNOWN_SERVER),
    ("logging", KNOWN_LOGGING),
];

/// A validation diagnostic.
#[derive(Debug)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub path: String,
    pub message: String,
}

#[derive(Debug, PartialEq)]
pub enum DiagnosticLevel {
    Ok,
    Warn,
    Error,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            DiagnosticLevel::Ok => "[OK]",
            DiagnosticLevel::Warn => "[WARN]",
            DiagnosticLevel::Error => "[ERROR]",
        };
        if self.path.is_empty() {
            write!(f, "{} {}", prefix, self.message)
        } else {
            write!(f, "{} {}: {}", prefix, self.path, self.message)
        }
    }
}

/// Levenshtein distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut row = vec![i + 1; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            row[j + 1] = (prev[j + 1] + 1).min(row[j] + 1).min(prev[j] + cost);
        }
        prev = row;
    }
    prev[b.len()]
}

/// Suggest the closest known field name (if distance <= 3).
pub fn suggest_field(unknown: &str, known: &[&str]) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by_key(|(_, d)| *d)
        .map(|(k, _)| format!("did you mean '{}'?", k))
}

fn unknown_keys(
    obj: &serde_json::Map<String, Value>,
    known: &[&str],
    prefix: &str,
    out: &mut Vec<Diagnostic>,
) {
    let known_set: HashSet<&str> = known.iter().copied().collect();
    for key in obj.keys() {
        if known_set.contains(key.as_str()) {
            continue;
        }
        let message = match suggest_field(key, known) {
            Some(hint) => format!("Unknown field '{}' ({})", key, hint),
            None => format!("Unknown field '{}'", key),
        };
        out.push(Diagnostic {
            level: DiagnosticLevel::Error,
            path: format!("{}{}", prefix, key),
            message,
        });
    }
}

/// Validate a raw JSON config value against known field names.
pub fn validate_config(raw: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match raw.as_object() {
        Some(o) => o,
        None => {
            diagnostics.push(Diagnostic {
                level: DiagnosticLevel::Error,
                path: String::new(),
                message: "Config must be a JSON object".to_string(),
            });
            return diagnostics;
        }
    };

    diagnostics.push(Diagnostic {
        level: DiagnosticLevel::Ok,
        path: String::new(),
        message: "Valid JSON".to_string(),
    });

    let mut unknown = Vec::new();
    unknown_keys(obj, KNOWN_TOP_LEVEL, "", &mut unknown);
    for (section, known) in SECTIONS {
        if let Some(inner) = obj.get(*section).and_then(|v| v.as_object()) {
            unknown_keys(inner, known, &format!("{}.", section), &mut unknown);
        }
    }

    if unknown.is_empty() {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Ok,
            path: String::new(),
            message: "All fields recognized".to_string(),
        });
    }
    diagnostics.extend(unknown);

    let has_key = obj
        .get("provider")
        .and_then(|p| p.get("api_key"))
        .and_then(|k| k.as_str())
        .is_some_and(|k| !k.trim().is_empty());
    if has_key {
        diagnostics.push(Diagnostic {
            level: DiagnosticLevel::Warn,
            path: "provider.api_key".to_string(),
            message: "Stored in plain text; prefer FINSIGHT_OPENAI_API_KEY".to_string(),
        });
    }

    diagnostics
}

/// Read and check a config file on disk.
pub fn check_file(path: &Path) -> Result<Vec<Diagnostic>> {
    let content = std::fs::read_to_string(path)?;
    let raw: Value = serde_json::from_str(&content)
        .map_err(|e| FinsightError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
    Ok(validate_config(&raw))
}
