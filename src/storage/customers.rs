use serde::{Deserialize, Serialize};

use super::{OrderBy, Record, Session, StorageError, Store};
use crate::model::Customer;

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Customer {
    const TABLE: &'static str = "customers";
    const ORDER: OrderBy = OrderBy::asc("name");

    type Row = CustomerRow;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_row(&self) -> CustomerRow {
        CustomerRow {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            notes: self.notes.clone(),
        }
    }

    fn from_row(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            address: row.address,
            notes: row.notes,
        }
    }
}

impl Store {
    pub async fn save_customer(
        &self,
        session: &Session,
        customer: &Customer,
    ) -> Result<Customer, StorageError> {
        self.save(session, customer).await
    }

    pub async fn load_customers(&self, session: &Session) -> Result<Vec<Customer>, StorageError> {
        self.load(session).await
    }

    pub async fn delete_customer(&self, session: &Session, id: &str) -> Result<(), StorageError> {
        self.delete::<Customer>(session, id).await
    }
}
