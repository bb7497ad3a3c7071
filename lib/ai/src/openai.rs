//! OpenAI-compatible chat-completion backend.
//!
//! Sends `POST {base_url}/chat/completions` with a bearer token and reads the
//! generated text from `choices[0].message.content`. Any non-success status
//! is surfaced as [`LlmError::UpstreamStatus`]; nothing is retried.

use crate::backend::{
    LlmBackend, LlmBackendConfig, LlmMessage, LlmProvider, LlmRequest, LlmResponse, TokenUsage,
    WebSearchOptions,
};
use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Backend for the OpenAI chat-completions API and compatible servers.
#[derive(Debug, Clone)]
pub struct OpenAiBackend {
    client: reqwest::Client,
    provider: LlmProvider,
    endpoint: String,
    api_key: String,
}

impl OpenAiBackend {
    /// Creates a backend from its configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be
    /// built.
    pub fn new(config: &LlmBackendConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::InvalidConfig {
                reason: "API key is empty".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| LlmError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            provider: config.provider,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }

    /// Returns the full completions URL this backend posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [LlmMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    web_search_options: Option<WebSearchBody<'a>>,
}

impl<'a> ChatCompletionBody<'a> {
    fn from_request(request: &'a LlmRequest) -> Self {
        Self {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            web_search_options: request.web_search.as_ref().map(WebSearchBody::from_options),
        }
    }
}

#[derive(Serialize)]
struct WebSearchBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    user_location: Option<UserLocation<'a>>,
}

impl<'a> WebSearchBody<'a> {
    fn from_options(options: &'a WebSearchOptions) -> Self {
        let user_location = options.has_location().then(|| UserLocation {
            kind: "approximate",
            approximate: ApproximateLocation {
                country: options.country.as_deref(),
                city: options.city.as_deref(),
                region: options.region.as_deref(),
            },
        });
        Self { user_location }
    }
}

#[derive(Serialize)]
struct UserLocation<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    approximate: ApproximateLocation<'a>,
}

#[derive(Serialize)]
struct ApproximateLocation<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    country: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    #[instrument(
        skip(self, request),
        fields(model = %request.model, messages = request.messages.len())
    )]
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = ChatCompletionBody::from_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, endpoint = %self.endpoint, "Completion request failed");
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::RequestFailed {
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::ResponseParseFailed {
                    reason: e.to_string(),
                })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmError::ResponseParseFailed {
                reason: "response contained no message content".to_string(),
            })?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        debug!(
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "Completion received"
        );

        Ok(LlmResponse {
            content,
            usage,
            model: parsed.model.unwrap_or_else(|| request.model.clone()),
        })
    }

    fn provider(&self) -> LlmProvider {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> OpenAiBackend {
        OpenAiBackend::new(&LlmBackendConfig::openai_compatible(server.uri(), "sk-test"))
            .expect("backend")
    }

    fn request() -> LlmRequest {
        LlmRequest::new(
            "gpt-4o",
            vec![
                LlmMessage::system("You are a helpful advisor."),
                LlmMessage::user("Wat kost dit huis?"),
            ],
        )
        .with_temperature(0.3)
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let err = OpenAiBackend::new(&LlmBackendConfig::openai("  ")).unwrap_err();
        assert!(matches!(err, LlmError::InvalidConfig { .. }));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        let backend =
            OpenAiBackend::new(&LlmBackendConfig::openai_compatible("http://llm.local/v1/", "k"))
                .expect("backend");
        assert_eq!(backend.endpoint(), "http://llm.local/v1/chat/completions");
    }

    #[tokio::test]
    async fn successful_completion_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "You are a helpful advisor."},
                    {"role": "user", "content": "Wat kost dit huis?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "gpt-4o-2024-08-06",
                "choices": [{"message": {"role": "assistant", "content": "Ongeveer 450.000 euro."}}],
                "usage": {"prompt_tokens": 20, "completion_tokens": 8}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = backend_for(&server)
            .generate(&request())
            .await
            .expect("completion");

        assert_eq!(response.content, "Ongeveer 450.000 euro.");
        assert_eq!(response.model, "gpt-4o-2024-08-06");
        assert_eq!(response.usage.total(), 28);
    }

    #[tokio::test]
    async fn optional_fields_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "max_tokens": 300,
                "web_search_options": {
                    "user_location": {"type": "approximate", "approximate": {"country": "NL"}}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": "ok"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = request()
            .with_max_tokens(300)
            .with_web_search(WebSearchOptions::for_country("NL"));
        let response = backend_for(&server)
            .generate(&request)
            .await
            .expect("completion");

        assert_eq!(response.content, "ok");
        assert_eq!(response.model, "gpt-4o");
    }

    #[tokio::test]
    async fn non_success_status_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .expect(1)
            .mount(&server)
            .await;

        let err = backend_for(&server).generate(&request()).await.unwrap_err();

        assert_eq!(
            err,
            LlmError::UpstreamStatus {
                status: 500,
                body: "upstream exploded".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn missing_content_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = backend_for(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, LlmError::ResponseParseFailed { .. }));
    }
}
