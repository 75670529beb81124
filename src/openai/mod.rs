//! Azure OpenAI adapters for embeddings and chat completions.
//!
//! Both capabilities live on one deployment-scoped REST surface, so a single
//! client implements the two traits. Requests carry the resource API key and
//! the configured API version; responses are decoded into the narrow slices
//! the pipelines consume.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the Azure OpenAI adapters.
#[derive(Debug, Error)]
pub enum OpenAiError {
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service responded with an unexpected status code.
    #[error("Unexpected Azure OpenAI response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The response decoded but did not carry the expected shape.
    #[error("Malformed Azure OpenAI response: {0}")]
    InvalidResponse(String),
}

/// A single role/content pair in a chat exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Message role (`system` or `user`).
    pub role: &'static str,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// Build a system-role message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    /// Build a user-role message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, OpenAiError>;
}

/// Interface implemented by chat-completion backends.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Run a chat exchange and return the model's reply, or `None` when the
    /// model produced empty content.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<Option<String>, OpenAiError>;
}

/// REST client for a deployment-scoped Azure OpenAI resource.
pub struct AzureOpenAiClient {
    pub(crate) http: Client,
    pub(crate) endpoint: String,
    pub(crate) api_key: String,
    pub(crate) api_version: String,
    pub(crate) embedding_deployment: String,
    pub(crate) chat_deployment: String,
}

impl AzureOpenAiClient {
    /// Construct a client using configuration derived from the environment.
    pub fn new(http: Client) -> Self {
        let config = get_config();
        tracing::debug!(
            endpoint = %config.openai_endpoint,
            embedding_deployment = %config.embedding_deployment,
            chat_deployment = %config.chat_deployment,
            "Initialized Azure OpenAI client"
        );
        Self {
            http,
            endpoint: config.openai_endpoint.trim_end_matches('/').to_string(),
            api_key: config.openai_api_key.clone(),
            api_version: config.openai_api_version.clone(),
            embedding_deployment: config.embedding_deployment.clone(),
            chat_deployment: config.chat_deployment.clone(),
        }
    }

    fn deployment_url(&self, deployment: &str, operation: &str) -> String {
        format!("{}/openai/deployments/{deployment}/{operation}", self.endpoint)
    }

    async fn post(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, OpenAiError> {
        let response = self
            .http
            .post(url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = OpenAiError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Azure OpenAI request failed");
            return Err(error);
        }

        Ok(response)
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl EmbeddingClient for AzureOpenAiClient {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, OpenAiError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let expected = texts.len();
        tracing::debug!(inputs = expected, "Generating embeddings");

        let response = self
            .post(
                self.deployment_url(&self.embedding_deployment, "embeddings"),
                json!({ "input": texts }),
            )
            .await?;

        let payload: EmbeddingsResponse = response.json().await?;
        let mut data = payload.data;
        data.sort_by_key(|item| item.index);
        let vectors: Vec<Vec<f32>> = data.into_iter().map(|item| item.embedding).collect();

        if vectors.len() != expected {
            return Err(OpenAiError::InvalidResponse(format!(
                "expected {expected} embeddings, got {}",
                vectors.len()
            )));
        }

        Ok(vectors)
    }
}

#[async_trait]
impl ChatClient for AzureOpenAiClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<Option<String>, OpenAiError> {
        let response = self
            .post(
                self.deployment_url(&self.chat_deployment, "chat/completions"),
                json!({ "messages": messages, "temperature": temperature }),
            )
            .await?;

        let payload: ChatResponse = response.json().await?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(if content.is_empty() {
            None
        } else {
            Some(content)
        })
    }
}
