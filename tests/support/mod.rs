#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
};
use bizlaunch360::config::{EMAIL_KEY_VAR, GATEWAY_KEY_VAR, OPENAI_KEY_VAR};
use bizlaunch360::email::{EmailSender, OutgoingEmail};
use bizlaunch360::gateway::{ByteStream, ChatGateway, ChatMessage, GatewayError, Provider};
use bizlaunch360::{AppState, ServerConfig, StaticSecrets, build_router};
use futures::StreamExt;
use http_body_util::BodyExt;
use parking_lot::Mutex;
use std::sync::Arc;
use tower::ServiceExt;

/// What the fake upstream answers with.
pub enum Reply {
    Content(String),
    Chunks(Vec<&'static str>),
    RateLimited,
    QuotaExceeded,
    Status(u16),
}

/// Records every call and answers with a canned [`Reply`].
pub struct FakeGateway {
    reply: Reply,
    calls: Mutex<Vec<(Provider, Vec<ChatMessage>)>>,
}

impl FakeGateway {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn content(text: impl Into<String>) -> Arc<Self> {
        Self::new(Reply::Content(text.into()))
    }

    pub fn calls(&self) -> Vec<(Provider, Vec<ChatMessage>)> {
        self.calls.lock().clone()
    }

    fn answer(&self, provider: Provider, messages: Vec<ChatMessage>) -> Result<(), GatewayError> {
        self.calls.lock().push((provider, messages));
        match &self.reply {
            Reply::RateLimited => Err(GatewayError::RateLimited),
            Reply::QuotaExceeded => Err(GatewayError::QuotaExceeded),
            Reply::Status(status) => Err(GatewayError::Status {
                status: *status,
                body: "upstream exploded".to_string(),
            }),
            Reply::Content(_) | Reply::Chunks(_) => Ok(()),
        }
    }
}

#[async_trait]
impl ChatGateway for FakeGateway {
    async fn complete(
        &self,
        provider: Provider,
        messages: Vec<ChatMessage>,
    ) -> Result<String, GatewayError> {
        self.answer(provider, messages)?;
        match &self.reply {
            Reply::Content(text) => Ok(text.clone()),
            Reply::Chunks(chunks) => Ok(chunks.concat()),
            _ => unreachable!(),
        }
    }

    async fn stream(
        &self,
        provider: Provider,
        messages: Vec<ChatMessage>,
    ) -> Result<ByteStream, GatewayError> {
        self.answer(provider, messages)?;
        let chunks: Vec<Bytes> = match &self.reply {
            Reply::Content(text) => vec![Bytes::from(text.clone())],
            Reply::Chunks(chunks) => chunks.iter().map(|c| Bytes::from_static(c.as_bytes())).collect(),
            _ => unreachable!(),
        };
        Ok(futures::stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

#[derive(Default)]
pub struct FakeEmail {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl EmailSender for FakeEmail {
    async fn send(&self, email: OutgoingEmail) -> Result<String, GatewayError> {
        let mut sent = self.sent.lock();
        sent.push(email);
        Ok(format!("email-{}", sent.len()))
    }

    fn default_from(&self) -> &str {
        "BizLaunch360 <noreply@bizlaunch360.test>"
    }
}

pub fn all_secrets() -> StaticSecrets {
    StaticSecrets::new()
        .with(GATEWAY_KEY_VAR, "gateway-key")
        .with(OPENAI_KEY_VAR, "openai-key")
        .with(EMAIL_KEY_VAR, "email-key")
}

/// Router around fake upstream clients.
pub fn app_with(gateway: Arc<FakeGateway>, email: Arc<FakeEmail>) -> Router {
    let state = AppState::with_clients(
        Arc::new(ServerConfig::default()),
        Arc::new(all_secrets()),
        gateway,
        email,
    )
    .expect("state");
    build_router(Arc::new(state))
}

pub fn app(gateway: Arc<FakeGateway>) -> Router {
    app_with(gateway, Arc::new(FakeEmail::default()))
}

/// Router with the real HTTP clients and no secrets at all.
pub fn unconfigured_app() -> Router {
    let state = AppState::new(
        Arc::new(ServerConfig::default()),
        Arc::new(StaticSecrets::new()),
    )
    .expect("state");
    build_router(Arc::new(state))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("json body")
    }
}

pub async fn send(router: Router, method: Method, uri: &str, body: Body) -> TestResponse {
    let response = router
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .expect("request"),
        )
        .await
        .expect("response");

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub async fn post_json(router: Router, uri: &str, body: serde_json::Value) -> TestResponse {
    send(router, Method::POST, uri, Body::from(body.to_string())).await
}
