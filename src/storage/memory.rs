//! In-process [`Backend`] for tests and local demos.
//!
//! Emulates the hosted database closely enough for the adapters: sessions map
//! to users, rows get uuid ids and `created_at` / `updated_at` stamps, and a
//! row is only visible to the user whose id it carries.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::{AuthUser, Backend, Direction, OrderBy, Row, Session, StorageError};

#[derive(Default)]
struct Inner {
    /// access token -> user
    sessions: HashMap<String, AuthUser>,
    tables: HashMap<&'static str, Vec<Row>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Inner {
    fn user(&self, session: &Session) -> Option<AuthUser> {
        self.sessions.get(session.access_token()).cloned()
    }

    /// Strictly increasing, so `updated_at` ordering is stable within a test.
    fn stamp(&mut self) -> Value {
        let mut now = Utc::now();
        if let Some(last) = self.last_stamp {
            if now <= last {
                now = last + chrono::Duration::nanoseconds(1);
            }
        }
        self.last_stamp = Some(now);
        Value::String(now.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }
}

#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `user_id` and returns a session for it.
    pub fn sign_in(&self, user_id: &str) -> Session {
        let token = uuid::Uuid::new_v4().to_string();
        self.inner.write().sessions.insert(
            token.clone(),
            AuthUser {
                id: user_id.to_string(),
                email: None,
            },
        );
        Session::new(token)
    }

    pub fn sign_out(&self, session: &Session) {
        self.inner.write().sessions.remove(session.access_token());
    }

    /// Rows in `table` across all users.
    pub fn row_count(&self, table: &str) -> usize {
        self.inner
            .read()
            .tables
            .get(table)
            .map(Vec::len)
            .unwrap_or_default()
    }
}

fn owner(row: &Row) -> Option<&str> {
    row.get("user_id").and_then(Value::as_str)
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn rls_violation() -> StorageError {
    StorageError::Backend {
        status: 403,
        message: "new row violates row-level security policy".to_string(),
    }
}

fn unauthorized() -> StorageError {
    StorageError::Backend {
        status: 401,
        message: "JWT expired or missing".to_string(),
    }
}

/// Postgres ordering for scalar columns: ascending puts nulls last.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn current_user(&self, session: &Session) -> Result<Option<AuthUser>, StorageError> {
        Ok(self.inner.read().user(session))
    }

    async fn insert(
        &self,
        session: &Session,
        table: &'static str,
        mut row: Row,
    ) -> Result<Value, StorageError> {
        let mut inner = self.inner.write();
        let user = inner.user(session).ok_or_else(unauthorized)?;
        if owner(&row) != Some(user.id.as_str()) {
            return Err(rls_violation());
        }

        let stamp = inner.stamp();
        row.insert(
            "id".to_string(),
            Value::String(uuid::Uuid::new_v4().to_string()),
        );
        row.insert("created_at".to_string(), stamp.clone());
        row.insert("updated_at".to_string(), stamp);

        inner.tables.entry(table).or_default().push(row.clone());
        Ok(Value::Object(row))
    }

    async fn update(
        &self,
        session: &Session,
        table: &'static str,
        id: &str,
        patch: Row,
    ) -> Result<Value, StorageError> {
        let mut inner = self.inner.write();
        let user = inner.user(session).ok_or_else(unauthorized)?;
        if let Some(new_owner) = owner(&patch) {
            if new_owner != user.id {
                return Err(rls_violation());
            }
        }
        let stamp = inner.stamp();

        let row = inner
            .tables
            .get_mut(table)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| row_id(row) == Some(id) && owner(row) == Some(user.id.as_str()))
            })
            .ok_or_else(|| StorageError::NotFound {
                table,
                id: id.to_string(),
            })?;

        for (column, value) in patch {
            if column != "id" {
                row.insert(column, value);
            }
        }
        row.insert("updated_at".to_string(), stamp);
        Ok(Value::Object(row.clone()))
    }

    async fn select(
        &self,
        session: &Session,
        table: &'static str,
        owner_id: &str,
        order: OrderBy,
    ) -> Result<Vec<Value>, StorageError> {
        let inner = self.inner.read();
        let Some(user) = inner.user(session) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<Row> = inner
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| owner(row) == Some(owner_id) && owner_id == user.id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            let ordering = compare(a.get(order.column), b.get(order.column));
            match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });
        Ok(rows.into_iter().map(Value::Object).collect())
    }

    async fn delete(
        &self,
        session: &Session,
        table: &'static str,
        id: &str,
    ) -> Result<(), StorageError> {
        let mut inner = self.inner.write();
        // rows the caller cannot see are silently left alone
        let Some(user) = inner.user(session) else {
            return Ok(());
        };
        if let Some(rows) = inner.tables.get_mut(table) {
            rows.retain(|row| !(row_id(row) == Some(id) && owner(row) == Some(user.id.as_str())));
        }
        Ok(())
    }
}
