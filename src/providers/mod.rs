//! Providers module - the LLM chat collaborator
//!
//! This module defines the `LLMProvider` trait and common types for talking
//! to a chat-completion backend. The shipped implementation targets the
//! OpenAI Chat Completions API (and compatible endpoints).
//!
//! # Example
//!
//! ```rust,ignore
//! use finsight::providers::{ChatOptions, Credentials, LLMProvider, OpenAIProvider};
//! use finsight::session::Message;
//!
//! async fn example() {
//!     let provider = OpenAIProvider::new();
//!     let creds = Credentials::new("sk-...");
//!     let messages = vec![Message::user("Hello!")];
//!
//!     let response = provider
//!         .chat(messages, "gpt-3.5-turbo", &creds, ChatOptions::new())
//!         .await
//!         .unwrap();
//!     println!("Response: {}", response.content);
//! }
//! ```

pub mod openai;
mod types;

use crate::error::ProviderError;

pub use openai::OpenAIProvider;
pub use types::{ChatOptions, Credentials, LLMProvider, LLMResponse, Usage};

/// Parse an HTTP status code and response body into a structured [`ProviderError`].
///
/// This centralizes the mapping from HTTP status codes to error classifications.
pub fn parse_provider_error(status: u16, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Auth(body.to_string()),
        404 => ProviderError::ModelNotFound(body.to_string()),
        429 => ProviderError::RateLimit(body.to_string()),
        400 => ProviderError::InvalidRequest(body.to_string()),
        408 | 504 => ProviderError::Timeout(body.to_string()),
        500..=599 => ProviderError::ServerError(body.to_string()),
        _ => ProviderError::Unknown(format!("HTTP {}: {}", status, body)),
    }
}
