//! Error types for Finsight
//!
//! This module defines the closed error taxonomy used throughout the crate.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations. Callers branch on [`FinsightError::kind`]
//! rather than matching on message text.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::advisor::ExtractionFailure;

// ============================================================================
// Provider Error Classification
// ============================================================================

/// Structured provider error classification.
///
/// Categorizes failures of the LLM chat collaborator so the operation
/// surface can report them without string matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// 401/403: Invalid API key or authentication failure
    Auth(String),
    /// 429: Rate limit or quota exceeded
    RateLimit(String),
    /// 500/502/503/504: Server-side errors
    ServerError(String),
    /// 400: Bad request, invalid JSON, malformed parameters
    InvalidRequest(String),
    /// 404: Model not found or endpoint not available
    ModelNotFound(String),
    /// No reply within the configured deadline
    Timeout(String),
    /// Connection, DNS, TLS or body decoding failure
    Transport(String),
    /// Catch-all for unrecognized HTTP statuses
    Unknown(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Auth(msg) => write!(f, "Authentication error: {}", msg),
            ProviderError::RateLimit(msg) => write!(f, "Rate limit error: {}", msg),
            ProviderError::ServerError(msg) => write!(f, "Server error: {}", msg),
            ProviderError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ProviderError::ModelNotFound(msg) => write!(f, "Model not found: {}", msg),
            ProviderError::Timeout(msg) => write!(f, "Timeout: {}", msg),
            ProviderError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ProviderError::Unknown(msg) => write!(f, "Unknown provider error: {}", msg),
        }
    }
}

impl ProviderError {
    /// Returns `true` if a caller could reasonably retry this request.
    ///
    /// Nothing inside the crate retries; this is a hint for the calling layer.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimit(_)
                | ProviderError::ServerError(_)
                | ProviderError::Timeout(_)
                | ProviderError::Transport(_)
        )
    }

    /// Returns the HTTP status code associated with this error, if applicable.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProviderError::Auth(_) => Some(401),
            ProviderError::RateLimit(_) => Some(429),
            ProviderError::ServerError(_) => Some(500),
            ProviderError::InvalidRequest(_) => Some(400),
            ProviderError::ModelNotFound(_) => Some(404),
            ProviderError::Timeout(_) => None,
            ProviderError::Transport(_) => None,
            ProviderError::Unknown(_) => None,
        }
    }
}

impl From<ProviderError> for FinsightError {
    fn from(err: ProviderError) -> Self {
        FinsightError::ProviderTyped(err)
    }
}

// ============================================================================
// Error Kind
// ============================================================================

/// Stable, serializable discriminant of a [`FinsightError`].
///
/// This is what the operation surface reports as `errorKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// A required field (text, question, credentials) was absent
    MissingInput,
    /// Bad model name, budget, or other operator-controlled setting
    ConfigurationError,
    /// The LLM service rejected the credentials
    AuthError,
    /// The LLM service throttled the request
    RateLimitError,
    /// The LLM service could not be reached or answered garbage
    TransportError,
    /// The LLM call exceeded its deadline
    UpstreamTimeout,
    /// Any other failure reported by the LLM service
    UpstreamError,
    /// The reply contained no `{ ... }` span
    NoJsonFound,
    /// The `{ ... }` span was not a valid JSON object
    InvalidJson,
    /// An uploaded document could not be read
    DocumentError,
    /// I/O or serialization failures inside the process
    Internal,
}

impl ErrorKind {
    /// Name used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingInput => "MissingInput",
            ErrorKind::ConfigurationError => "ConfigurationError",
            ErrorKind::AuthError => "AuthError",
            ErrorKind::RateLimitError => "RateLimitError",
            ErrorKind::TransportError => "TransportError",
            ErrorKind::UpstreamTimeout => "UpstreamTimeout",
            ErrorKind::UpstreamError => "UpstreamError",
            ErrorKind::NoJsonFound => "NoJsonFound",
            ErrorKind::InvalidJson => "InvalidJson",
            ErrorKind::DocumentError => "DocumentError",
            ErrorKind::Internal => "Internal",
        }
    }

    /// Whether the end user can fix this by changing their request.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, ErrorKind::MissingInput | ErrorKind::DocumentError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Primary Error Type
// ============================================================================

/// The primary error type for Finsight operations.
#[derive(Error, Debug)]
pub enum FinsightError {
    /// A required input was absent or empty
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Configuration-related errors (unknown tokenizer model, zero budget, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Structured failure of the LLM chat collaborator
    #[error("Upstream error: {0}")]
    ProviderTyped(ProviderError),

    /// The LLM reply did not contain a usable expense object
    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    /// A document could not be parsed for text
    #[error("Document error: {0}")]
    Document(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FinsightError {
    /// Classify this error into its [`ErrorKind`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            FinsightError::MissingInput(_) => ErrorKind::MissingInput,
            FinsightError::Config(_) => ErrorKind::ConfigurationError,
            FinsightError::ProviderTyped(err) => match err {
                ProviderError::Auth(_) => ErrorKind::AuthError,
                ProviderError::RateLimit(_) => ErrorKind::RateLimitError,
                ProviderError::Transport(_) => ErrorKind::TransportError,
                ProviderError::Timeout(_) => ErrorKind::UpstreamTimeout,
                ProviderError::ServerError(_)
                | ProviderError::InvalidRequest(_)
                | ProviderError::ModelNotFound(_)
                | ProviderError::Unknown(_) => ErrorKind::UpstreamError,
            },
            FinsightError::Extraction(ExtractionFailure::NoJsonFound { .. }) => {
                ErrorKind::NoJsonFound
            }
            FinsightError::Extraction(ExtractionFailure::InvalidJson { .. }) => {
                ErrorKind::InvalidJson
            }
            FinsightError::Document(_) => ErrorKind::DocumentError,
            FinsightError::Io(_) | FinsightError::Json(_) => ErrorKind::Internal,
        }
    }

    /// Raw model output kept for manual inspection, if this error carries any.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            FinsightError::Extraction(failure) => Some(failure.raw()),
            _ => None,
        }
    }
}

/// A specialized `Result` type for Finsight operations.
pub type Result<T> = std::result::Result<T, FinsightError>;
