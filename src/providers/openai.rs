//! OpenAI Provider Implementation
//!
//! This module implements the `LLMProvider` trait for OpenAI's Chat Completions API,
//! handling message conversion, error classification, and response parsing.
//!
//! # Example
//!
//! ```rust,ignore
//! use finsight::providers::{ChatOptions, Credentials, LLMProvider, OpenAIProvider};
//! use finsight::session::Message;
//!
//! async fn example() {
//!     let provider = OpenAIProvider::new();
//!
//!     let messages = vec![
//!         Message::system("You are a helpful financial assistant."),
//!         Message::user("Hello!"),
//!     ];
//!
//!     let response = provider
//!         .chat(messages, "gpt-3.5-turbo", &Credentials::new("sk-..."), ChatOptions::default())
//!         .await
//!         .unwrap();
//!
//!     println!("OpenAI: {}", response.content);
//! }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, Result};
use crate::session::{Message, Role};

use super::{parse_provider_error, ChatOptions, Credentials, LLMProvider, LLMResponse, Usage};

/// The OpenAI API endpoint URL.
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

// ============================================================================
// OpenAI API Request Types
// ============================================================================

/// OpenAI API request body.
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    /// Model identifier
    model: String,
    /// Conversation messages (including system)
    messages: Vec<OpenAIMessage>,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// Temperature for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A message in OpenAI's format.
#[derive(Debug, Serialize)]
struct OpenAIMessage {
    /// Role: "system", "user" or "assistant"
    role: String,
    content: String,
}

// ============================================================================
// OpenAI API Response Types
// ============================================================================

/// OpenAI API response body.
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    /// Text content (null on refusals or tool-only replies)
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// OpenAI API error response.
#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
    #[serde(default)]
    r#type: Option<String>,
}

// ============================================================================
// OpenAI Provider
// ============================================================================

/// OpenAI LLM provider.
///
/// Holds no credentials of its own; the API key arrives with each request.
pub struct OpenAIProvider {
    /// API base URL
    api_base: String,
    /// HTTP client for making requests
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider using the default endpoint.
    ///
    /// # Example
    /// ```
    /// use finsight::providers::{LLMProvider, OpenAIProvider};
    ///
    /// let provider = OpenAIProvider::new();
    /// assert_eq!(provider.name(), "openai");
    /// ```
    pub fn new() -> Self {
        Self::with_base_url(OPENAI_API_URL)
    }

    /// Create a new OpenAI provider with a custom base URL.
    ///
    /// This is useful for OpenAI-compatible APIs (Azure, local models, etc.).
    /// A trailing slash is removed.
    pub fn with_base_url(api_base: &str) -> Self {
        Self::with_client(api_base, Client::new())
    }

    /// Create a new OpenAI provider with a custom HTTP client.
    ///
    /// Use this for custom timeouts or proxies.
    pub fn with_client(api_base: &str, client: Client) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// The base URL requests are sent to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

impl Default for OpenAIProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Convert Finsight messages to OpenAI API format.
fn convert_messages(messages: Vec<Message>) -> Vec<OpenAIMessage> {
    messages
        .into_iter()
        .map(|msg| OpenAIMessage {
            role: match msg.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
            }
            .to_string(),
            content: msg.content,
        })
        .collect()
}

/// Convert OpenAI API response to a Finsight LLMResponse.
fn convert_response(response: OpenAIResponse) -> LLMResponse {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .unwrap_or_default();

    let mut llm_response = LLMResponse::text(&content);
    if let Some(usage) = response.usage {
        llm_response =
            llm_response.with_usage(Usage::new(usage.prompt_tokens, usage.completion_tokens));
    }
    llm_response
}

/// Classify a reqwest failure that happened before any HTTP status arrived.
fn classify_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(format!("OpenAI request timed out: {}", err))
    } else {
        ProviderError::Transport(format!("OpenAI request failed: {}", err))
    }
}

// ============================================================================
// LLMProvider Implementation
// ============================================================================

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn chat(
        &self,
        messages: Vec<Message>,
        model: &str,
        credentials: &Credentials,
        options: ChatOptions,
    ) -> Result<LLMResponse> {
        let request = OpenAIRequest {
            model: model.to_string(),
            messages: convert_messages(messages),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        debug!(
            model = model,
            messages = request.messages.len(),
            "OpenAI request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base))
            .header(
                "Authorization",
                format!("Bearer {}", credentials.api_key()),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(classify_send_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            let detail = match serde_json::from_str::<OpenAIErrorResponse>(&error_text) {
                Ok(error_response) => match error_response.error.r#type {
                    Some(kind) => format!("{} - {}", kind, error_response.error.message),
                    None => error_response.error.message,
                },
                Err(_) => error_text,
            };

            return Err(parse_provider_error(
                status.as_u16(),
                &format!("OpenAI API error ({}): {}", status, detail),
            )
            .into());
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            ProviderError::Transport(format!("Failed to parse OpenAI response: {}", e))
        })?;

        info!(model = model, "OpenAI response received");
        Ok(convert_response(openai_response))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, FinsightError};
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAIProvider::new();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.api_base(), "https://api.openai.com/v1");
    }

    #[test]
    fn test_openai_provider_with_base_url() {
        let provider = OpenAIProvider::with_base_url("https://custom.api/v1/");
        assert_eq!(provider.api_base(), "https://custom.api/v1");
    }

    #[test]
    fn test_convert_messages_simple() {
        let messages = vec![
            Message::system("You are helpful"),
            Message::user("Hello"),
            Message::assistant("Hi there!"),
        ];
        let converted = convert_messages(messages);

        assert_eq!(converted.len(), 3);
        assert_eq!(converted[0].role, "system");
        assert_eq!(converted[0].content, "You are helpful");
        assert_eq!(converted[1].role, "user");
        assert_eq!(converted[2].role, "assistant");
        assert_eq!(converted[2].content, "Hi there!");
    }

    #[test]
    fn test_convert_response_text_only() {
        let response = OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIResponseMessage {
                    content: Some("Hello!".to_string()),
                },
            }],
            usage: Some(OpenAIUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
            }),
        };
        let converted = convert_response(response);

        assert_eq!(converted.content, "Hello!");
        let usage = converted.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 10);
        assert_eq!(usage.total_tokens, 15);
    }

    #[test]
    fn test_convert_response_empty_choices() {
        let converted = convert_response(OpenAIResponse {
            choices: vec![],
            usage: None,
        });
        assert_eq!(converted.content, "");
    }

    #[test]
    fn test_convert_response_null_content() {
        let converted = convert_response(OpenAIResponse {
            choices: vec![OpenAIChoice {
                message: OpenAIResponseMessage { content: None },
            }],
            usage: None,
        });
        assert_eq!(converted.content, "");
    }

    #[test]
    fn test_openai_request_serialization() {
        let request = OpenAIRequest {
            model: "gpt-3.5-turbo".to_string(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: "Hello".to_string(),
            }],
            max_tokens: Some(1000),
            temperature: None,
        };

        let json = serde_json::to_string(&request).unwrap();

        assert!(json.contains("gpt-3.5-turbo"));
        assert!(json.contains("max_tokens"));
        assert!(json.contains("Hello"));
        assert!(!json.contains("temperature"));
    }

    #[tokio::test]
    async fn test_chat_sends_bearer_key_and_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    {"role": "system", "content": "persona"},
                    {"role": "user", "content": "question"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Mocked summary"}}],
                "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAIProvider::with_base_url(&server.uri());
        let response = provider
            .chat(
                vec![Message::system("persona"), Message::user("question")],
                "gpt-3.5-turbo",
                &Credentials::new("sk-test"),
                ChatOptions::new(),
            )
            .await
            .unwrap();

        assert_eq!(response.content, "Mocked summary");
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_chat_maps_401_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::with_base_url(&server.uri());
        let err = provider
            .chat(
                vec![Message::user("hi")],
                "gpt-3.5-turbo",
                &Credentials::new("sk-bad"),
                ChatOptions::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AuthError);
        assert!(err.to_string().contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn test_chat_maps_429_to_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Too Many Requests"))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::with_base_url(&server.uri());
        let err = provider
            .chat(
                vec![Message::user("hi")],
                "gpt-3.5-turbo",
                &Credentials::new("sk-test"),
                ChatOptions::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FinsightError::ProviderTyped(ProviderError::RateLimit(_))
        ));
    }

    #[tokio::test]
    async fn test_chat_garbage_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let provider = OpenAIProvider::with_base_url(&server.uri());
        let err = provider
            .chat(
                vec![Message::user("hi")],
                "gpt-3.5-turbo",
                &Credentials::new("sk-test"),
                ChatOptions::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportError);
    }

    #[tokio::test]
    async fn test_chat_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to run an HTTP server.
        let provider = OpenAIProvider::with_base_url("http://127.0.0.1:9");
        let err = provider
            .chat(
                vec![Message::user("hi")],
                "gpt-3.5-turbo",
                &Credentials::new("sk-test"),
                ChatOptions::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransportError);
    }
}
