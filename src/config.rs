use anyhow::{Context, Result};
use clap::Parser;
use reqwest::Url;
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8787";
const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
const DEFAULT_GATEWAY_MODEL: &str = "google/gemini-2.5-flash";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_EMAIL_URL: &str = "https://api.resend.com";
const DEFAULT_EMAIL_FROM: &str = "BizLaunch360 <onboarding@resend.dev>";
const DEFAULT_SHUTDOWN_GRACE_SECS: u64 = 30;

pub const GATEWAY_KEY_VAR: &str = "AI_GATEWAY_API_KEY";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const EMAIL_KEY_VAR: &str = "RESEND_API_KEY";

/// Upstream chat-completion endpoint with its fixed model and secret name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    pub api_key_var: String,
}

impl ProviderConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub base_url: String,
    pub default_from: String,
    pub api_key_var: String,
}

impl EmailConfig {
    pub fn send_url(&self) -> String {
        format!("{}/emails", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub http_bind_address: SocketAddr,
    pub gateway: ProviderConfig,
    pub openai: ProviderConfig,
    pub email: EmailConfig,
    /// Unset means the HTTP client's own default (no deadline).
    pub upstream_timeout: Option<Duration>,
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_bind_address: default_bind(),
            gateway: ProviderConfig {
                base_url: DEFAULT_GATEWAY_URL.to_string(),
                model: DEFAULT_GATEWAY_MODEL.to_string(),
                api_key_var: GATEWAY_KEY_VAR.to_string(),
            },
            openai: ProviderConfig {
                base_url: DEFAULT_OPENAI_URL.to_string(),
                model: DEFAULT_OPENAI_MODEL.to_string(),
                api_key_var: OPENAI_KEY_VAR.to_string(),
            },
            email: EmailConfig {
                base_url: DEFAULT_EMAIL_URL.to_string(),
                default_from: DEFAULT_EMAIL_FROM.to_string(),
                api_key_var: EMAIL_KEY_VAR.to_string(),
            },
            upstream_timeout: None,
            shutdown_grace_secs: DEFAULT_SHUTDOWN_GRACE_SECS,
        }
    }
}

fn default_bind() -> SocketAddr {
    DEFAULT_HTTP_BIND
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 8787)))
}

impl ServerConfig {
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            http_bind: cli_http_bind,
            gateway_url: cli_gateway_url,
            gateway_model: cli_gateway_model,
            openai_url: cli_openai_url,
            openai_model: cli_openai_model,
            email_url: cli_email_url,
            email_from: cli_email_from,
            upstream_timeout_secs: cli_upstream_timeout,
            shutdown_grace_secs: cli_shutdown_grace,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            http_bind: file_http_bind,
            gateway_url: file_gateway_url,
            gateway_model: file_gateway_model,
            openai_url: file_openai_url,
            openai_model: file_openai_model,
            email_url: file_email_url,
            email_from: file_email_from,
            upstream_timeout_secs: file_upstream_timeout,
            shutdown_grace_secs: file_shutdown_grace,
        } = file_config;

        let defaults = Self::default();

        let upstream_timeout = cli_upstream_timeout
            .or(file_upstream_timeout)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            http_bind_address: cli_http_bind
                .or(file_http_bind)
                .unwrap_or(defaults.http_bind_address),
            gateway: ProviderConfig {
                base_url: cli_gateway_url
                    .or(file_gateway_url)
                    .unwrap_or(defaults.gateway.base_url),
                model: cli_gateway_model
                    .or(file_gateway_model)
                    .unwrap_or(defaults.gateway.model),
                api_key_var: defaults.gateway.api_key_var,
            },
            openai: ProviderConfig {
                base_url: cli_openai_url
                    .or(file_openai_url)
                    .unwrap_or(defaults.openai.base_url),
                model: cli_openai_model
                    .or(file_openai_model)
                    .unwrap_or(defaults.openai.model),
                api_key_var: defaults.openai.api_key_var,
            },
            email: EmailConfig {
                base_url: cli_email_url
                    .or(file_email_url)
                    .unwrap_or(defaults.email.base_url),
                default_from: cli_email_from
                    .or(file_email_from)
                    .unwrap_or(defaults.email.default_from),
                api_key_var: defaults.email.api_key_var,
            },
            upstream_timeout,
            shutdown_grace_secs: cli_shutdown_grace
                .or(file_shutdown_grace)
                .unwrap_or(defaults.shutdown_grace_secs),
        })
    }

    /// Fail fast on endpoints that could never be called.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("gateway", &self.gateway.base_url),
            ("openai", &self.openai.base_url),
            ("email", &self.email.base_url),
        ] {
            let parsed = Url::parse(url)
                .with_context(|| format!("invalid {name} base url {url:?}"))?;
            anyhow::ensure!(
                matches!(parsed.scheme(), "http" | "https"),
                "{name} base url {url:?} must use http or https"
            );
        }
        anyhow::ensure!(
            !self.gateway.model.trim().is_empty(),
            "gateway model must not be empty"
        );
        anyhow::ensure!(
            !self.openai.model.trim().is_empty(),
            "openai model must not be empty"
        );
        anyhow::ensure!(
            !self.email.default_from.trim().is_empty(),
            "default email sender must not be empty"
        );
        Ok(())
    }
}

#[derive(Parser, Debug, Default, Clone)]
#[command(name = "bizlaunch360", about = "BizLaunch360 prompt handler server", version)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML, JSON or TOML)",
        global = true
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        env = "BIZLAUNCH_HTTP_BIND",
        value_name = "ADDR",
        help = "HTTP bind address"
    )]
    pub http_bind: Option<SocketAddr>,

    #[arg(
        long,
        env = "BIZLAUNCH_GATEWAY_URL",
        value_name = "URL",
        help = "Base URL of the AI gateway chat-completion API"
    )]
    pub gateway_url: Option<String>,

    #[arg(
        long,
        env = "BIZLAUNCH_GATEWAY_MODEL",
        value_name = "MODEL",
        help = "Model identifier sent to the AI gateway"
    )]
    pub gateway_model: Option<String>,

    #[arg(
        long,
        env = "BIZLAUNCH_OPENAI_URL",
        value_name = "URL",
        help = "Base URL of the OpenAI-compatible API"
    )]
    pub openai_url: Option<String>,

    #[arg(
        long,
        env = "BIZLAUNCH_OPENAI_MODEL",
        value_name = "MODEL",
        help = "Model identifier sent to the OpenAI-compatible API"
    )]
    pub openai_model: Option<String>,

    #[arg(
        long,
        env = "BIZLAUNCH_EMAIL_URL",
        value_name = "URL",
        help = "Base URL of the transactional email API"
    )]
    pub email_url: Option<String>,

    #[arg(
        long,
        env = "BIZLAUNCH_EMAIL_FROM",
        value_name = "SENDER",
        help = "Sender used when a send-email request omits `from`"
    )]
    pub email_from: Option<String>,

    #[arg(
        long,
        env = "BIZLAUNCH_UPSTREAM_TIMEOUT_SECS",
        value_name = "SECS",
        help = "Optional deadline for upstream calls (0 disables)"
    )]
    pub upstream_timeout_secs: Option<u64>,

    #[arg(
        long,
        env = "BIZLAUNCH_SHUTDOWN_GRACE_SECS",
        value_name = "SECS",
        help = "Seconds to let in-flight requests finish after a shutdown signal"
    )]
    pub shutdown_grace_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PartialConfig {
    http_bind: Option<SocketAddr>,
    gateway_url: Option<String>,
    gateway_model: Option<String>,
    openai_url: Option<String>,
    openai_model: Option<String>,
    email_url: Option<String>,
    email_from: Option<String>,
    upstream_timeout_secs: Option<u64>,
    shutdown_grace_secs: Option<u64>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        "toml" => toml::from_str(&contents)
            .with_context(|| format!("failed to parse TOML config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
