//! Per-user persistence of dashboard records.
//!
//! Every call takes the caller's [`Session`] explicitly and resolves the
//! current user through the backend before touching a table; rows are
//! stamped with and filtered by that user's id. Row-level access control is
//! the backend's job.

pub mod appointments;
pub mod business_plans;
pub mod customers;
pub mod memory;
pub mod rest;
pub mod services;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

pub use memory::MemoryBackend;
pub use rest::RestBackend;

pub type Row = Map<String, Value>;

/// Caller credentials forwarded to the backend on every call.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("User not authenticated")]
    NotAuthenticated,

    #[error("{table} row {id} not found")]
    NotFound { table: &'static str, id: String },

    #[error("storage backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    #[error("storage request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to decode storage row: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

/// Fixed sort applied by `load`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub direction: Direction,
}

impl OrderBy {
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Asc,
        }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Desc,
        }
    }
}

/// Row-level operations against a PostgREST-style database.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The user owning `session`, or `None` when it is not signed in.
    async fn current_user(&self, session: &Session) -> Result<Option<AuthUser>, StorageError>;

    /// Inserts `row` and returns it as stored.
    async fn insert(&self, session: &Session, table: &'static str, row: Row)
    -> Result<Value, StorageError>;

    /// Applies `patch` to the row with `id` and returns it as stored.
    async fn update(
        &self,
        session: &Session,
        table: &'static str,
        id: &str,
        patch: Row,
    ) -> Result<Value, StorageError>;

    async fn select(
        &self,
        session: &Session,
        table: &'static str,
        owner: &str,
        order: OrderBy,
    ) -> Result<Vec<Value>, StorageError>;

    async fn delete(&self, session: &Session, table: &'static str, id: &str)
    -> Result<(), StorageError>;
}

/// An application record with a table row counterpart.
pub trait Record: Sized {
    const TABLE: &'static str;
    const ORDER: OrderBy;

    /// Row shape, snake_case, as written to the table.
    type Row: Serialize + DeserializeOwned;

    fn id(&self) -> Option<&str>;
    fn to_row(&self) -> Self::Row;
    fn from_row(row: Self::Row) -> Self;
}

/// Typed access to the tables behind a [`Backend`].
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn Backend>,
}

impl Store {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Resolves the signed-in user, failing when there is none.
    pub async fn require_user(&self, session: &Session) -> Result<AuthUser, StorageError> {
        self.backend
            .current_user(session)
            .await?
            .ok_or(StorageError::NotAuthenticated)
    }

    /// Inserts `record` when it has no id, updates it otherwise.
    pub async fn save<R: Record>(&self, session: &Session, record: &R) -> Result<R, StorageError> {
        let user = self.require_user(session).await?;
        let mut row = encode_row(&record.to_row())?;
        row.remove("id");
        row.insert("user_id".to_string(), Value::String(user.id.clone()));

        let stored = match record.id() {
            Some(id) => {
                tracing::debug!(table = R::TABLE, id, "updating row");
                self.backend.update(session, R::TABLE, id, row).await?
            }
            None => {
                tracing::debug!(table = R::TABLE, "inserting row");
                self.backend.insert(session, R::TABLE, row).await?
            }
        };
        decode_row::<R>(stored)
    }

    /// All of the caller's records in the table's fixed order.
    pub async fn load<R: Record>(&self, session: &Session) -> Result<Vec<R>, StorageError> {
        let user = self.require_user(session).await?;
        let rows = self
            .backend
            .select(session, R::TABLE, &user.id, R::ORDER)
            .await?;
        rows.into_iter().map(decode_row::<R>).collect()
    }

    pub async fn delete<R: Record>(&self, session: &Session, id: &str) -> Result<(), StorageError> {
        self.require_user(session).await?;
        self.backend.delete(session, R::TABLE, id).await
    }

    /// Applies a partial update to one row of `R`'s table.
    pub(crate) async fn patch<R: Record>(
        &self,
        session: &Session,
        id: &str,
        patch: Row,
    ) -> Result<R, StorageError> {
        self.require_user(session).await?;
        let stored = self.backend.update(session, R::TABLE, id, patch).await?;
        decode_row::<R>(stored)
    }
}

fn encode_row<T: Serialize>(row: &T) -> Result<Row, StorageError> {
    match serde_json::to_value(row)? {
        Value::Object(map) => Ok(map),
        other => Err(StorageError::Decode(serde::ser::Error::custom(format!(
            "row did not serialize to an object: {other}"
        )))),
    }
}

fn decode_row<R: Record>(value: Value) -> Result<R, StorageError> {
    let row: R::Row = serde_json::from_value(value)?;
    Ok(R::from_row(row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_debug_hides_the_token() {
        let session = Session::new("secret-token");
        let printed = format!("{session:?}");
        assert!(!printed.contains("secret-token"));
        assert_eq!(session.access_token(), "secret-token");
    }

    #[test]
    fn order_renders_postgrest_style() {
        let order = OrderBy::desc("updated_at");
        assert_eq!(format!("{}.{}", order.column, order.direction), "updated_at.desc");
    }
}
