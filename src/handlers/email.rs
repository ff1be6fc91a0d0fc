//! `send-email`: transactional email through the configured provider.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::Instrument;

use super::{finish, parse_body, require_text};
use crate::email::OutgoingEmail;
use crate::error::HandlerError;
use crate::logging::handler_span;
use crate::metrics::RequestMetrics;
use crate::state::AppState;

pub const NAME: &str = "send-email";

/// A single address or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    fn into_vec(self) -> Vec<String> {
        let list = match self {
            Recipients::One(address) => vec![address],
            Recipients::Many(addresses) => addresses,
        };
        list.into_iter()
            .map(|address| address.trim().to_string())
            .filter(|address| !address.is_empty())
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SendEmailRequest {
    pub to: Option<Recipients>,
    pub subject: Option<String>,
    pub html: Option<String>,
    pub text: Option<String>,
    pub from: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub id: String,
}

impl SendEmailRequest {
    /// Validates the request and fills in the sender.
    pub fn into_email(self, default_from: &str) -> Result<OutgoingEmail, HandlerError> {
        let to = self.to.map(Recipients::into_vec).unwrap_or_default();
        if to.is_empty() {
            return Err(HandlerError::validation("to is required"));
        }
        require_text(self.subject.as_deref(), "subject")?;

        let html = non_blank(self.html);
        let text = non_blank(self.text);
        if html.is_none() && text.is_none() {
            return Err(HandlerError::validation("html or text is required"));
        }

        Ok(OutgoingEmail {
            from: non_blank(self.from).unwrap_or_else(|| default_from.to_string()),
            to,
            subject: self.subject.unwrap_or_default(),
            html,
            text,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

pub async fn send_email(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let metrics = RequestMetrics::new(NAME);
    let result = async {
        let request: SendEmailRequest = parse_body(&body)?;
        let email = request.into_email(state.email().default_from())?;
        let recipients = email.to.len();
        let id = state.email().send(email).await?;
        tracing::debug!(%id, recipients, "email accepted by provider");
        Ok::<_, HandlerError>(Json(SendEmailResponse { id }).into_response())
    }
    .instrument(handler_span(NAME))
    .await;
    finish(NAME, metrics, result)
}
