//! [`Backend`] over the hosted database's HTTP API.
//!
//! Auth lives at `/auth/v1/user`; tables at `/rest/v1/<table>` with
//! PostgREST filters (`id=eq.<id>`, `order=<column>.<direction>`). Every
//! request carries the project's public `apikey` plus the caller's bearer
//! token, so row-level policies see the real user.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{AuthUser, Backend, OrderBy, Row, Session, StorageError};

const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Debug, Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl RestBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, StorageError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn request(&self, method: Method, path: &str, session: &Session) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .bearer_auth(session.access_token())
    }

    fn table(&self, method: Method, table: &str, session: &Session) -> RequestBuilder {
        self.request(method, &format!("/rest/v1/{table}"), session)
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, StorageError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorPayload>(&body)
            .ok()
            .and_then(|payload| payload.message.or(payload.error_description))
            .unwrap_or(body);
        tracing::warn!(status = status.as_u16(), %message, "storage request failed");
        Err(StorageError::Backend {
            status: status.as_u16(),
            message,
        })
    }

    /// First row of a `return=representation` response.
    async fn single(
        response: reqwest::Response,
        table: &'static str,
        id: &str,
    ) -> Result<Value, StorageError> {
        let rows: Vec<Value> = response.json().await?;
        rows.into_iter().next().ok_or_else(|| StorageError::NotFound {
            table,
            id: id.to_string(),
        })
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn current_user(&self, session: &Session) -> Result<Option<AuthUser>, StorageError> {
        let response = self
            .request(Method::GET, "/auth/v1/user", session)
            .send()
            .await?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Ok(None),
            status if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(StorageError::Backend {
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }
        Ok(Some(response.json().await?))
    }

    async fn insert(
        &self,
        session: &Session,
        table: &'static str,
        row: Row,
    ) -> Result<Value, StorageError> {
        let request = self
            .table(Method::POST, table, session)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row);
        let response = Self::send(request).await?;
        Self::single(response, table, "<new>").await
    }

    async fn update(
        &self,
        session: &Session,
        table: &'static str,
        id: &str,
        patch: Row,
    ) -> Result<Value, StorageError> {
        let request = self
            .table(Method::PATCH, table, session)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        let response = Self::send(request).await?;
        Self::single(response, table, id).await
    }

    async fn select(
        &self,
        session: &Session,
        table: &'static str,
        owner: &str,
        order: OrderBy,
    ) -> Result<Vec<Value>, StorageError> {
        let request = self.table(Method::GET, table, session).query(&[
            ("select", "*".to_string()),
            ("user_id", format!("eq.{owner}")),
            ("order", format!("{}.{}", order.column, order.direction)),
        ]);
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }

    async fn delete(
        &self,
        session: &Session,
        table: &'static str,
        id: &str,
    ) -> Result<(), StorageError> {
        let request = self
            .table(Method::DELETE, table, session)
            .query(&[("id", format!("eq.{id}"))]);
        Self::send(request).await?;
        Ok(())
    }
}
