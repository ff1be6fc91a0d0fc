//! Chat-completion client for the hosted model providers.

use async_trait::async_trait;
use axum::body::Bytes;
use futures::{StreamExt, TryStreamExt, stream::BoxStream};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;
use thiserror::Error;

use crate::config::{ProviderConfig, ServerConfig};
use crate::secrets::SecretStore;

/// Raw upstream body chunks, forwarded without inspection.
pub type ByteStream = BoxStream<'static, Result<Bytes, io::Error>>;

/// Which configured endpoint a handler talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum Provider {
    /// Hosted AI gateway, used by most handlers.
    Gateway,
    /// OpenAI-compatible API.
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0} is not configured")]
    MissingKey(String),

    #[error("upstream rate limit exceeded")]
    RateLimited,

    #[error("upstream quota exceeded")]
    QuotaExceeded,

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Maps a non-OK upstream status onto the error taxonomy.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited,
            StatusCode::PAYMENT_REQUIRED => GatewayError::QuotaExceeded,
            other => GatewayError::Status {
                status: other.as_u16(),
                body,
            },
        }
    }
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Awaits the full completion and returns `choices[0].message.content`.
    async fn complete(
        &self,
        provider: Provider,
        messages: Vec<ChatMessage>,
    ) -> Result<String, GatewayError>;

    /// Requests a streamed completion and hands back the upstream body.
    async fn stream(
        &self,
        provider: Provider,
        messages: Vec<ChatMessage>,
    ) -> Result<ByteStream, GatewayError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// reqwest-backed gateway talking to OpenAI-compatible endpoints.
pub struct HttpGateway {
    client: reqwest::Client,
    gateway: ProviderConfig,
    openai: ProviderConfig,
    secrets: Arc<dyn SecretStore>,
}

impl HttpGateway {
    pub fn new(config: &ServerConfig, secrets: Arc<dyn SecretStore>) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            gateway: config.gateway.clone(),
            openai: config.openai.clone(),
            secrets,
        })
    }

    fn provider(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::Gateway => &self.gateway,
            Provider::OpenAi => &self.openai,
        }
    }

    async fn send(
        &self,
        provider: Provider,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let target = self.provider(provider);
        let api_key = self
            .secrets
            .get(&target.api_key_var)
            .ok_or_else(|| GatewayError::MissingKey(target.api_key_var.clone()))?;

        let body = CompletionRequest {
            model: &target.model,
            messages,
            stream,
        };

        tracing::debug!(
            provider = %provider,
            model = %target.model,
            messages = messages.len(),
            stream,
            "calling chat completion endpoint"
        );

        let response = self
            .client
            .post(target.completions_url())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(provider = %provider, status = status.as_u16(), "upstream returned error status");
            return Err(GatewayError::from_status(status, body));
        }
        Ok(response)
    }
}

#[async_trait]
impl ChatGateway for HttpGateway {
    async fn complete(
        &self,
        provider: Provider,
        messages: Vec<ChatMessage>,
    ) -> Result<String, GatewayError> {
        let response = self.send(provider, &messages, false).await?;
        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GatewayError::Malformed("completion has no message content".into()))
    }

    async fn stream(
        &self,
        provider: Provider,
        messages: Vec<ChatMessage>,
    ) -> Result<ByteStream, GatewayError> {
        let response = self.send(provider, &messages, true).await?;
        Ok(response
            .bytes_stream()
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
            .boxed())
    }
}
