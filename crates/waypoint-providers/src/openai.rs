//! OpenAI embeddings and chat completions.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use waypoint_core::{BackendError, ChatMessage, Embedder, ModelInvoker};

use crate::http;

/// OpenAI settings, from the `[openai]` section or `WAYPOINT_OPENAI__*`.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    600
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            embedding_model: default_embedding_model(),
            chat_model: default_chat_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ── Wire Types ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

// ── Client ───────────────────────────────────────────────────────

/// OpenAI API client. Clone is cheap (reqwest's client is an Arc).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    auth_header: String,
    base_url: String,
    embedding_model: String,
    chat_model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, BackendError> {
        Ok(Self {
            http: http::build_client(Duration::from_secs(config.timeout_secs))?,
            auth_header: format!("Bearer {}", config.api_key),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn headers(&self) -> [(&str, &str); 1] {
        [("Authorization", self.auth_header.as_str())]
    }
}

#[async_trait]
impl ModelInvoker for OpenAiClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, BackendError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.chat_model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response: ChatResponse = http::post_json(&self.http, &url, &self.headers(), &body).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| BackendError::InvalidResponse("No choices in response".to_string()))?;

        let answer = content.trim().to_string();
        tracing::debug!(model = %self.chat_model, chars = answer.len(), "Chat completion received");
        Ok(answer)
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = EmbeddingRequest {
            model: &self.embedding_model,
            input: [text],
        };

        let response: EmbeddingResponse =
            http::post_json(&self.http, &url, &self.headers(), &body).await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| BackendError::InvalidResponse("No embedding in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiClient {
        let config = OpenAiConfig {
            api_key: "test-key".to_string(),
            base_url: format!("{}/", server.uri()),
            timeout_secs: 1,
            ..Default::default()
        };
        OpenAiClient::new(&config).unwrap()
    }

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You are a travel assistant."),
            ChatMessage::user("Suggest a 3-day itinerary in Hanoi"),
        ]
    }

    #[test]
    fn default_config() {
        let config = OpenAiConfig::default();
        assert_eq!(config.chat_model, "gpt-4o-mini");
        assert_eq!(config.embedding_model, "text-embedding-3-small");
        assert_eq!(config.max_tokens, 600);
    }

    #[tokio::test]
    async fn generate_returns_trimmed_answer() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1/chat/completions"))
            .and(matchers::header("authorization", "Bearer test-key"))
            .and(matchers::body_partial_json(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 600,
                "messages": [
                    {"role": "system", "content": "You are a travel assistant."},
                    {"role": "user", "content": "Suggest a 3-day itinerary in Hanoi"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-1",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "  Day 1: Old Quarter.\n"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client_for(&server).generate(&messages()).await.unwrap();
        assert_eq!(answer, "Day 1: Old Quarter.");
    }

    #[tokio::test]
    async fn generate_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&messages()).await.unwrap_err();
        assert_eq!(err, BackendError::RateLimited("Rate limit reached".to_string()));
    }

    #[tokio::test]
    async fn generate_without_choices_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&messages()).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn slow_response_is_timeout() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"choices": []}))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).generate(&messages()).await.unwrap_err();
        assert!(matches!(err, BackendError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn embed_returns_first_vector() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/v1/embeddings"))
            .and(matchers::body_partial_json(serde_json::json!({
                "model": "text-embedding-3-small",
                "input": ["Hanoi street food"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [{"index": 0, "embedding": [0.25, -0.5, 1.0]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vector = client_for(&server).embed("Hanoi street food").await.unwrap();
        assert_eq!(vector, vec![0.25, -0.5, 1.0]);
    }
}
