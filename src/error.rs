//! Error taxonomy surfaced by the prompt handlers.
//!
//! Every failure a handler can hit collapses into [`HandlerError`], which
//! renders as `{ "error": "..." }` with one of three statuses: 429 when the
//! upstream rate-limits, 402 when the upstream blocks on billing, 500 for
//! everything else.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum HandlerError {
    /// A secret or endpoint the handler needs is not configured.
    #[error("Server configuration error: {0}")]
    Configuration(String),

    /// The request body was not valid JSON for this handler.
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    /// A required field was missing or blank.
    #[error("{0}")]
    Validation(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI usage limit reached. Please add credits to your workspace to continue.")]
    QuotaExceeded,

    /// Non-OK status or transport failure talking to an upstream service.
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// The upstream answered OK but without the expected content.
    #[error("Failed to parse upstream response: {0}")]
    ResponseParse(String),

    #[error("Failed to render prompt: {0}")]
    Template(String),
}

impl HandlerError {
    pub fn validation(message: impl Into<String>) -> Self {
        HandlerError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            HandlerError::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Configuration(_) => "configuration",
            HandlerError::InvalidBody(_) => "invalid_body",
            HandlerError::Validation(_) => "validation",
            HandlerError::RateLimited => "rate_limited",
            HandlerError::QuotaExceeded => "quota_exceeded",
            HandlerError::Upstream(_) => "upstream",
            HandlerError::ResponseParse(_) => "response_parse",
            HandlerError::Template(_) => "template",
        }
    }
}

impl From<GatewayError> for HandlerError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::MissingKey(name) => {
                HandlerError::Configuration(format!("{name} is not configured"))
            }
            GatewayError::RateLimited => HandlerError::RateLimited,
            GatewayError::QuotaExceeded => HandlerError::QuotaExceeded,
            GatewayError::Status { status, body } => {
                HandlerError::Upstream(format!("status {status}: {body}"))
            }
            GatewayError::Transport(source) => HandlerError::Upstream(source.to_string()),
            GatewayError::Malformed(message) => HandlerError::ResponseParse(message),
        }
    }
}

impl From<tera::Error> for HandlerError {
    fn from(error: tera::Error) -> Self {
        HandlerError::Template(error.to_string())
    }
}

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            HandlerError::RateLimited | HandlerError::QuotaExceeded => {
                tracing::warn!(error.kind = self.kind(), status = status.as_u16(), "{}", self);
            }
            _ => {
                tracing::error!(error.kind = self.kind(), status = status.as_u16(), "{}", self);
            }
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
