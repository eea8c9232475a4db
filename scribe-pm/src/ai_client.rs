//! HTTP client for the scribe-ai functions service

use reqwest::Client;
use scribe_common::api::{
    AbstractInput, AbstractLanguage, AnalyzeDocumentRequest, AnalyzeDocumentResponse,
    AnalyzeTextRequest, AnalyzeTextResponse, GenerateAbstractRequest, GenerateAbstractResponse,
    Suggestion, Tip,
};
use scribe_common::Section;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AiServiceSettings;

/// Gateway calls inside scribe-ai take up to 60 s; leave headroom
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum AiClientError {
    #[error("AI service unreachable: {0}")]
    Network(String),

    /// scribe-ai answered with an error body
    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("Invalid response from AI service: {0}")]
    Decode(String),
}

/// Error body shared by every scribe-ai failure shape
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct AiClient {
    client: Client,
    base_url: String,
    service_key: Option<String>,
}

impl AiClient {
    pub fn new(settings: AiServiceSettings) -> Result<Self, AiClientError> {
        let client = Client::builder()
            .user_agent(concat!("scribe-pm/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AiClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            service_key: settings.service_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, AiClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "Calling AI service");

        let mut request = self.client.post(&url).json(body);
        if let Some(key) = &self.service_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AiClientError::Network(e.to_string()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AiClientError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            warn!(status = status.as_u16(), path, "AI service error: {}", message);
            return Err(AiClientError::Service {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| AiClientError::Decode(e.to_string()))
    }

    /// Section review; `text` is plain text
    pub async fn analyze_text(
        &self,
        section: Section,
        text: &str,
    ) -> Result<Vec<Suggestion>, AiClientError> {
        let response: AnalyzeTextResponse = self
            .post(
                "/analyze-text",
                &AnalyzeTextRequest {
                    section: section.column().to_string(),
                    content: text.to_string(),
                },
            )
            .await?;

        match response.error {
            Some(message) => Err(AiClientError::Service {
                status: 200,
                message,
            }),
            None => Ok(response.suggestions),
        }
    }

    /// Whole-article review
    pub async fn analyze_document(
        &self,
        request: &AnalyzeDocumentRequest,
    ) -> Result<Vec<Tip>, AiClientError> {
        let response: AnalyzeDocumentResponse = self.post("/analyze-document", request).await?;

        match response.error {
            Some(message) => Err(AiClientError::Service {
                status: 200,
                message,
            }),
            None => Ok(response.tips),
        }
    }

    pub async fn generate_abstract(
        &self,
        input: AbstractInput,
        language: AbstractLanguage,
    ) -> Result<GenerateAbstractResponse, AiClientError> {
        let response: GenerateAbstractResponse = self
            .post(
                "/generate-abstract",
                &GenerateAbstractRequest { input, language },
            )
            .await?;

        match response.error {
            Some(message) => Err(AiClientError::Service {
                status: 200,
                message,
            }),
            None => Ok(response),
        }
    }
}
