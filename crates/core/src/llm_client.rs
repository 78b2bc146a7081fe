use crate::{
    error::AssessmentError,
    turn::{ConversationTurn, Role},
};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api.mistral.ai/v1";
pub const DEFAULT_MODEL: &str = "mistral-large-latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Sampling parameters for a single completion call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// A chat-completion backend.
///
/// Implementations make exactly one outbound call per invocation and never
/// retry; any transport failure, timeout or non-success status is reported as
/// [`AssessmentError::UpstreamCompletion`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the content of the first generated assistant message.
    async fn complete(
        &self,
        messages: Vec<ConversationTurn>,
        params: GenerationParams,
    ) -> Result<String, AssessmentError>;
}

/// A `CompletionClient` for any OpenAI-compatible chat completions API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer credential for the service.
    /// * `api_base` - Base URL, e.g. `https://api.mistral.ai/v1`.
    /// * `model` - Model identifier to request (e.g. "mistral-large-latest").
    /// * `timeout` - Upper bound for a whole request, connection included.
    pub fn new(
        api_key: &str,
        api_base: &str,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AssessmentError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssessmentError::Configuration(format!("HTTP client: {}", e)))?;

        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);

        // The library retries rate-limited calls on its own; a zero budget
        // turns that off.
        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        Ok(Self {
            client: Client::with_config(config)
                .with_http_client(http_client)
                .with_backoff(no_retry),
            model,
        })
    }
}

fn to_request_message(turn: ConversationTurn) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    Ok(match turn.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(turn.content)
            .build()?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(turn.content)
            .build()?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(turn.content)
            .build()?
            .into(),
    })
}

fn upstream(err: OpenAIError) -> AssessmentError {
    AssessmentError::UpstreamCompletion(err.to_string())
}

#[async_trait]
impl CompletionClient for OpenAICompatibleClient {
    async fn complete(
        &self,
        messages: Vec<ConversationTurn>,
        params: GenerationParams,
    ) -> Result<String, AssessmentError> {
        let message_count = messages.len();
        let messages = messages
            .into_iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>, _>>()
            .map_err(upstream)?;

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(params.temperature)
            .max_tokens(params.max_tokens)
            .build()
            .map_err(upstream)?;

        debug!(model = %self.model, message_count, "Sending chat completion request");
        let response: CreateChatCompletionResponse =
            self.client.chat().create(request).await.map_err(upstream)?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                AssessmentError::UpstreamCompletion(
                    "LLM response had no choice with text content".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_generation_params() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.max_tokens, 512);
    }

    #[test]
    fn test_every_role_converts() {
        let system = to_request_message(ConversationTurn::system("persona")).unwrap();
        let user = to_request_message(ConversationTurn::user("Bonjour")).unwrap();
        let assistant = to_request_message(ConversationTurn::assistant("Salut")).unwrap();

        assert!(matches!(system, ChatCompletionRequestMessage::System(_)));
        assert!(matches!(user, ChatCompletionRequestMessage::User(_)));
        assert!(matches!(assistant, ChatCompletionRequestMessage::Assistant(_)));
    }

    #[test]
    fn test_client_builds_with_default_endpoint() {
        let client = OpenAICompatibleClient::new(
            "test-key",
            DEFAULT_API_BASE,
            DEFAULT_MODEL.to_string(),
            DEFAULT_REQUEST_TIMEOUT,
        );
        assert!(client.is_ok());
    }

    fn client_for(server: &wiremock::MockServer) -> OpenAICompatibleClient {
        OpenAICompatibleClient::new(
            "test-key",
            &server.uri(),
            DEFAULT_MODEL.to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn completion_body(choices: serde_json::Value) -> String {
        serde_json::json!({
            "id": "cmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": DEFAULT_MODEL,
            "choices": choices
        })
        .to_string()
    }

    fn assistant_choice(content: &str) -> serde_json::Value {
        serde_json::json!([{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }])
    }

    fn error_body(message: &str, kind: &str) -> String {
        serde_json::json!({
            "error": { "message": message, "type": kind, "param": null, "code": null }
        })
        .to_string()
    }

    async fn complete_once(server: &wiremock::MockServer) -> Result<String, AssessmentError> {
        client_for(server)
            .complete(
                vec![
                    ConversationTurn::system("persona"),
                    ConversationTurn::user("Bonjour"),
                ],
                GenerationParams::default(),
            )
            .await
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_content() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat/completions"))
            .and(wiremock::matchers::header("authorization", "Bearer test-key"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "model": DEFAULT_MODEL,
                "max_tokens": DEFAULT_MAX_TOKENS,
                "messages": [
                    { "role": "system", "content": "persona" },
                    { "role": "user", "content": "Bonjour" }
                ]
            })))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_raw(
                completion_body(assistant_choice("Salut")),
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(complete_once(&server).await, Ok("Salut".to_string()));
    }

    #[tokio::test]
    async fn test_rate_limited_call_is_not_retried() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat/completions"))
            .respond_with(
                wiremock::ResponseTemplate::new(429)
                    .set_body_raw(error_body("rate", "rate_limit"), "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = complete_once(&server).await;
        assert!(matches!(result, Err(AssessmentError::UpstreamCompletion(_))));
    }

    #[tokio::test]
    async fn test_server_error_is_an_upstream_error() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/chat/completions"))
            .respond_with(
                wiremock::ResponseTemplate::new(500)
                    .set_body_raw(error_body("boom", "server_error"), "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = complete_once(&server).await;
        assert!(matches!(result, Err(AssessmentError::UpstreamCompletion(_))));
    }

    #[tokio::test]
    async fn test_response_without_text_is_an_upstream_error() {
        for choices in [serde_json::json!([]), assistant_choice("")] {
            let server = wiremock::MockServer::start().await;
            wiremock::Mock::given(wiremock::matchers::method("POST"))
                .and(wiremock::matchers::path("/chat/completions"))
                .respond_with(
                    wiremock::ResponseTemplate::new(200)
                        .set_body_raw(completion_body(choices), "application/json"),
                )
                .expect(1)
                .mount(&server)
                .await;

            let result = complete_once(&server).await;
            assert_eq!(
                result,
                Err(AssessmentError::UpstreamCompletion(
                    "LLM response had no choice with text content".to_string()
                ))
            );
        }
    }
}
