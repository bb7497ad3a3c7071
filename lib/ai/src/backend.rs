//! LLM backend abstraction.
//!
//! Provides a unified interface over chat-completion providers. The
//! conversation pipeline only ever talks to [`LlmBackend`].

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Available LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// OpenAI API.
    OpenAi,
    /// Generic OpenAI-compatible API.
    OpenAiCompatible,
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAi => f.write_str("openai"),
            Self::OpenAiCompatible => f.write_str("openai_compatible"),
        }
    }
}

/// Default base URL of the OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for an LLM backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmBackendConfig {
    /// The provider type.
    pub provider: LlmProvider,
    /// Base URL for the API, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Bearer token sent with every request.
    pub api_key: String,
}

impl LlmBackendConfig {
    /// Creates a configuration for the public OpenAI API.
    #[must_use]
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            base_url: OPENAI_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Creates a configuration for an OpenAI-compatible endpoint.
    #[must_use]
    pub fn openai_compatible(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            provider: LlmProvider::OpenAiCompatible,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

/// Locale hints for provider-side web search augmentation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchOptions {
    /// Two-letter ISO country code, e.g. `NL`.
    pub country: Option<String>,
    /// Free-form city name.
    pub city: Option<String>,
    /// Free-form region name.
    pub region: Option<String>,
}

impl WebSearchOptions {
    /// Creates web search options scoped to a country.
    #[must_use]
    pub fn for_country(country: impl Into<String>) -> Self {
        Self {
            country: Some(country.into()),
            ..Default::default()
        }
    }

    /// Returns true if no locale hint is set.
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.country.is_some() || self.city.is_some() || self.region.is_some()
    }
}

/// A chat-completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// Model identifier.
    pub model: String,
    /// Ordered, role-tagged messages.
    pub messages: Vec<LlmMessage>,
    /// Temperature for sampling (0.0 - 2.0).
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Provider-side search augmentation.
    pub web_search: Option<WebSearchOptions>,
}

impl LlmRequest {
    /// Creates a request for the given model and transcript.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<LlmMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            web_search: None,
        }
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Enables web search augmentation.
    #[must_use]
    pub fn with_web_search(mut self, options: WebSearchOptions) -> Self {
        self.web_search = Some(options);
        self
    }
}

/// A message in a completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
}

impl LlmMessage {
    /// Creates a message with an explicit role.
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User/human message.
    User,
    /// Assistant/AI message.
    Assistant,
    /// System message.
    System,
}

/// A response from an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated content.
    pub content: String,
    /// Token usage statistics.
    pub usage: TokenUsage,
    /// Model that generated the response.
    pub model: String,
}

impl LlmResponse {
    /// Creates a response with empty usage statistics.
    #[must_use]
    pub fn text(model: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: TokenUsage::default(),
            model: model.into(),
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Returns the total number of tokens.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Trait for LLM backends.
///
/// Implementations must treat every non-success answer as terminal for the
/// request: no retries, no backoff.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generates a response for the given request.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport fails, the provider answers with a
    /// non-success status, or the response cannot be parsed.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Returns the provider type.
    fn provider(&self) -> LlmProvider;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_request_builder() {
        let request = LlmRequest::new("gpt-4o", vec![LlmMessage::user("Hello, world!")])
            .with_temperature(0.3)
            .with_max_tokens(300)
            .with_web_search(WebSearchOptions::for_country("NL"));

        assert_eq!(request.model, "gpt-4o");
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.temperature, Some(0.3));
        assert_eq!(request.max_tokens, Some(300));
        assert_eq!(
            request.web_search.and_then(|w| w.country),
            Some("NL".to_string())
        );
    }

    #[test]
    fn llm_message_roles_serialize_lowercase() {
        let json = serde_json::to_value(LlmMessage::system("be brief")).expect("serialize");
        assert_eq!(json, serde_json::json!({"role": "system", "content": "be brief"}));
    }

    #[test]
    fn token_usage_total() {
        let usage = TokenUsage {
            input_tokens: 100,
            output_tokens: 50,
        };
        assert_eq!(usage.total(), 150);
    }

    #[test]
    fn web_search_location_detection() {
        assert!(!WebSearchOptions::default().has_location());
        assert!(WebSearchOptions::for_country("NL").has_location());
    }

    #[test]
    fn backend_config_defaults_to_public_api() {
        let config = LlmBackendConfig::openai("sk-test");
        assert_eq!(config.provider, LlmProvider::OpenAi);
        assert_eq!(config.base_url, OPENAI_BASE_URL);
    }
}
