//! HTTP handlers mounted under `/functions/v1/`.
//!
//! Every prompt handler has the same shape: parse the body, validate it,
//! build a system + user prompt, make one chat-completion call and either
//! reshape the buffered answer or pass the upstream stream straight through.
//! That shape lives here once; each handler module only describes its task.

pub mod appointment_reminders;
pub mod assistant;
pub mod business_plan;
pub mod content;
pub mod customer_messaging;
pub mod email;
pub mod financial_forecast;
pub mod marketing_ideas;
pub mod task_suggestions;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::Instrument;

use crate::error::HandlerError;
use crate::gateway::{ChatMessage, Provider};
use crate::logging::handler_span;
use crate::metrics::RequestMetrics;
use crate::prompts::PromptLibrary;
use crate::state::AppState;

/// What a single prompt handler sends upstream.
pub trait ChatTask: Send + Sync + 'static {
    /// Route segment, also used as the metrics and log label.
    const NAME: &'static str;
    const PROVIDER: Provider;

    type Request: DeserializeOwned + Send + Sync;

    /// Rejects requests missing required fields.
    fn validate(_request: &Self::Request) -> Result<(), HandlerError> {
        Ok(())
    }

    fn messages(
        request: &Self::Request,
        prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError>;
}

/// A [`ChatTask`] whose completion is awaited and reshaped into JSON.
pub trait BufferedTask: ChatTask {
    type Output: Serialize + Send;

    fn respond(request: Self::Request, content: String) -> Self::Output;
}

/// Axum handler for any [`BufferedTask`].
pub async fn buffered<T: BufferedTask>(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Response {
    let metrics = RequestMetrics::new(T::NAME);
    let result = run_buffered::<T>(&state, &body)
        .instrument(handler_span(T::NAME))
        .await
        .map(|output| Json(output).into_response());
    finish(T::NAME, metrics, result)
}

async fn run_buffered<T: BufferedTask>(
    state: &AppState,
    body: &[u8],
) -> Result<T::Output, HandlerError> {
    let request: T::Request = parse_body(body)?;
    T::validate(&request)?;
    let messages = T::messages(&request, state.prompts())?;
    let content = state.gateway().complete(T::PROVIDER, messages).await?;
    Ok(T::respond(request, content))
}

/// Axum handler for any [`ChatTask`] answered as a server-sent event stream.
///
/// The upstream body is forwarded chunk for chunk; nothing is buffered or
/// rewritten.
pub async fn streamed<T: ChatTask>(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let metrics = RequestMetrics::new(T::NAME);
    let result = async {
        let request: T::Request = parse_body(&body)?;
        T::validate(&request)?;
        let messages = T::messages(&request, state.prompts())?;
        let stream = state.gateway().stream(T::PROVIDER, messages).await?;
        Ok::<_, HandlerError>(
            (
                [
                    (header::CONTENT_TYPE, "text/event-stream"),
                    (header::CACHE_CONTROL, "no-cache"),
                ],
                Body::from_stream(stream),
            )
                .into_response(),
        )
    }
    .instrument(handler_span(T::NAME))
    .await;
    finish(T::NAME, metrics, result)
}

/// Parses the raw body. Anything unparseable is an [`HandlerError::InvalidBody`].
pub(crate) fn parse_body<R: DeserializeOwned>(body: &[u8]) -> Result<R, HandlerError> {
    Ok(serde_json::from_slice(body)?)
}

/// Records metrics, logs the outcome and renders errors.
pub(crate) fn finish(
    handler: &'static str,
    metrics: RequestMetrics,
    result: Result<Response, HandlerError>,
) -> Response {
    let duration = metrics.elapsed();
    match result {
        Ok(response) => {
            metrics.success();
            crate::log_handler!(handler, "success", duration, "invocation completed");
            response
        }
        Err(error) => {
            metrics.error(error.kind());
            crate::log_handler!(
                handler,
                "error",
                duration,
                error.kind = error.kind(),
                "invocation failed"
            );
            error.into_response()
        }
    }
}

/// CORS pre-flight: 200 with an empty body. Headers come from the router layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fails with a validation error when `value` is absent or blank.
pub(crate) fn require_text(value: Option<&str>, field: &str) -> Result<(), HandlerError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(()),
        _ => Err(HandlerError::validation(format!("{field} is required"))),
    }
}

/// Reads an explicit `null` the same as an absent key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_body_rejects_garbage() {
        let result: Result<serde_json::Value, _> = parse_body(b"not json");
        assert_matches!(result, Err(HandlerError::InvalidBody(_)));
    }

    #[test]
    fn parse_body_rejects_empty_body() {
        let result: Result<serde_json::Value, _> = parse_body(b"");
        assert_matches!(result, Err(HandlerError::InvalidBody(_)));
    }

    #[test]
    fn require_text_treats_blank_as_missing() {
        assert!(require_text(Some("hi"), "message").is_ok());
        assert_matches!(
            require_text(Some("   "), "message"),
            Err(HandlerError::Validation(message)) if message == "message is required"
        );
        assert_matches!(require_text(None, "title"), Err(HandlerError::Validation(_)));
    }

    #[derive(Debug, Default, serde::Deserialize)]
    #[serde(default)]
    struct Nested {
        #[serde(deserialize_with = "null_as_default")]
        items: Vec<u32>,
    }

    #[test]
    fn null_reads_as_default() {
        let nested: Nested = parse_body(br#"{"items": null}"#).unwrap();
        assert!(nested.items.is_empty());
        let nested: Nested = parse_body(br#"{"items": [1, 2]}"#).unwrap();
        assert_eq!(nested.items, vec![1, 2]);
        let nested: Nested = parse_body(b"{}").unwrap();
        assert!(nested.items.is_empty());
    }
}
