//! Transactional email delivery.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{EmailConfig, ServerConfig};
use crate::gateway::GatewayError;
use crate::secrets::SecretStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Sends the message and returns the provider's message id.
    async fn send(&self, email: OutgoingEmail) -> Result<String, GatewayError>;

    /// Sender address used when the caller does not supply one.
    fn default_from(&self) -> &str;
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

/// Client for a Resend-compatible `/emails` endpoint.
pub struct ResendClient {
    client: reqwest::Client,
    config: EmailConfig,
    secrets: Arc<dyn SecretStore>,
}

impl ResendClient {
    pub fn new(config: &ServerConfig, secrets: Arc<dyn SecretStore>) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.upstream_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config: config.email.clone(),
            secrets,
        })
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: OutgoingEmail) -> Result<String, GatewayError> {
        let api_key = self
            .secrets
            .get(&self.config.api_key_var)
            .ok_or_else(|| GatewayError::MissingKey(self.config.api_key_var.clone()))?;

        let response = self
            .client
            .post(self.config.send_url())
            .bearer_auth(api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::from_status(status, body));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|err| GatewayError::Malformed(err.to_string()))?;
        tracing::info!(recipients = email.to.len(), message_id = %sent.id, "email accepted");
        Ok(sent.id)
    }

    fn default_from(&self) -> &str {
        &self.config.default_from
    }
}
