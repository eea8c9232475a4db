//! Chat-completion gateway client
//!
//! Posts OpenAI-compatible chat requests and returns the first choice's
//! message content. The [`ChatCompletion`] trait is the seam that lets tests
//! substitute a fake gateway.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Gateway failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("API key não configurada")]
    MissingApiKey,

    /// HTTP 429
    #[error("Limite de requisições excedido. Tente novamente em alguns instantes.")]
    RateLimited,

    /// HTTP 402
    #[error("Créditos insuficientes. Adicione créditos ao workspace.")]
    PaymentRequired,

    /// Any other non-success status
    #[error("Erro da IA: {status}")]
    Api { status: u16, body: String },

    #[error("Falha de comunicação com a IA: {0}")]
    Network(String),

    #[error("Resposta vazia da IA")]
    EmptyResponse,

    /// Reply text was not the JSON we asked for
    #[error("Resposta inválida da IA: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Anything that can answer a chat request
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Content of the first choice; never empty on success
    async fn complete(&self, request: ChatRequest) -> Result<String, GatewayError>;
}

/// Gateway connection settings
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub url: String,
    /// `None` makes every call fail with [`GatewayError::MissingApiKey`]
    pub api_key: Option<String>,
    pub requests_per_second: u32,
}

type DirectLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// reqwest-backed gateway client
pub struct GatewayClient {
    client: Client,
    url: String,
    api_key: Option<String>,
    rate_limiter: DirectLimiter,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(concat!("scribe-ai/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            client,
            url: config.url,
            api_key: config.api_key.filter(|k| !k.trim().is_empty()),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ChatCompletion for GatewayClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, GatewayError> {
        let api_key = self.api_key.as_deref().ok_or(GatewayError::MissingApiKey)?;

        self.rate_limiter.until_ready().await;

        debug!(model = %request.model, max_tokens = request.max_tokens, "Calling chat gateway");

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Chat gateway returned error");
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited,
                StatusCode::PAYMENT_REQUIRED => GatewayError::PaymentRequired,
                _ => GatewayError::Api {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        first_choice_content(parsed)
    }
}

fn first_choice_content(response: ChatResponse) -> Result<String, GatewayError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GatewayError::EmptyResponse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_omits_missing_temperature() {
        let request = ChatRequest {
            model: "google/gemini-2.5-flash".to_string(),
            messages: vec![ChatMessage::system("s"), ChatMessage::user("u")],
            max_tokens: 800,
            temperature: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][1]["role"], "user");
    }

    #[test]
    fn test_first_choice_extracted() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"[]"}},{"message":{"content":"x"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_choice_content(response).unwrap(), "[]");
    }

    #[test]
    fn test_missing_or_blank_content_is_empty_response() {
        for body in [r#"{"choices":[]}"#, r#"{}"#, r#"{"choices":[{"message":{"content":"  "}}]}"#] {
            let response: ChatResponse = serde_json::from_str(body).unwrap();
            assert_eq!(first_choice_content(response), Err(GatewayError::EmptyResponse));
        }
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_network() {
        let client = GatewayClient::new(GatewayConfig {
            url: "http://127.0.0.1:9/unused".to_string(),
            api_key: Some("   ".to_string()),
            requests_per_second: 0,
        })
        .unwrap();
        assert!(!client.has_api_key());

        let err = client
            .complete(ChatRequest {
                model: "m".to_string(),
                messages: vec![],
                max_tokens: 1,
                temperature: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::MissingApiKey);
        assert_eq!(err.to_string(), "API key não configurada");
    }
}
