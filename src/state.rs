use crate::config::ServerConfig;
use crate::email::{EmailSender, ResendClient};
use crate::gateway::{ChatGateway, HttpGateway};
use crate::prompts::PromptLibrary;
use crate::secrets::SecretStore;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Immutable state shared by every handler invocation.
pub struct AppState {
    config: Arc<ServerConfig>,
    secrets: Arc<dyn SecretStore>,
    gateway: Arc<dyn ChatGateway>,
    email: Arc<dyn EmailSender>,
    prompts: PromptLibrary,
}

impl AppState {
    /// Builds the HTTP-backed clients from configuration.
    pub fn new(config: Arc<ServerConfig>, secrets: Arc<dyn SecretStore>) -> Result<Self> {
        let gateway = HttpGateway::new(&config, secrets.clone())
            .context("failed to build chat gateway client")?;
        let email = ResendClient::new(&config, secrets.clone())
            .context("failed to build email client")?;
        Self::with_clients(config, secrets, Arc::new(gateway), Arc::new(email))
    }

    /// Builds state around caller-supplied clients.
    pub fn with_clients(
        config: Arc<ServerConfig>,
        secrets: Arc<dyn SecretStore>,
        gateway: Arc<dyn ChatGateway>,
        email: Arc<dyn EmailSender>,
    ) -> Result<Self> {
        let prompts = PromptLibrary::new().context("failed to compile prompt templates")?;
        Ok(Self {
            config,
            secrets,
            gateway,
            email,
            prompts,
        })
    }

    pub fn config(&self) -> &Arc<ServerConfig> {
        &self.config
    }

    pub fn secrets(&self) -> &Arc<dyn SecretStore> {
        &self.secrets
    }

    pub fn gateway(&self) -> &dyn ChatGateway {
        self.gateway.as_ref()
    }

    pub fn email(&self) -> &dyn EmailSender {
        self.email.as_ref()
    }

    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }
}
