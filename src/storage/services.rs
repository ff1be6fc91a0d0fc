use serde::{Deserialize, Serialize};

use super::{OrderBy, Record, Session, StorageError, Store};
use crate::model::Service;

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub duration: i32,
    pub price: f64,
}

impl Record for Service {
    const TABLE: &'static str = "services";
    const ORDER: OrderBy = OrderBy::asc("name");

    type Row = ServiceRow;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_row(&self) -> ServiceRow {
        ServiceRow {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            duration: self.duration,
            price: self.price,
        }
    }

    fn from_row(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            duration: row.duration,
            price: row.price,
        }
    }
}

impl Store {
    pub async fn save_service(
        &self,
        session: &Session,
        service: &Service,
    ) -> Result<Service, StorageError> {
        self.save(session, service).await
    }

    /// The caller's services, alphabetical.
    pub async fn load_services(&self, session: &Session) -> Result<Vec<Service>, StorageError> {
        self.load(session).await
    }

    pub async fn delete_service(&self, session: &Session, id: &str) -> Result<(), StorageError> {
        self.delete::<Service>(session, id).await
    }
}
