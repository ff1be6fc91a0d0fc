use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{OrderBy, Record, Row, Session, StorageError, Store};
use crate::model::{Appointment, AppointmentStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub duration: i32,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Record for Appointment {
    const TABLE: &'static str = "appointments";
    const ORDER: OrderBy = OrderBy::asc("appointment_date");

    type Row = AppointmentRow;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_row(&self) -> AppointmentRow {
        AppointmentRow {
            id: self.id.clone(),
            title: self.title.clone(),
            customer_name: self.customer_name.clone(),
            customer_email: self.customer_email.clone(),
            customer_phone: self.customer_phone.clone(),
            appointment_date: self.date,
            appointment_time: self.time.clone(),
            duration: self.duration,
            status: self.status,
            service_name: self.service_name.clone(),
            notes: self.notes.clone(),
        }
    }

    fn from_row(row: AppointmentRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            customer_phone: row.customer_phone,
            date: row.appointment_date,
            time: clock_time(row.appointment_time),
            duration: row.duration,
            status: row.status,
            service_name: row.service_name,
            notes: row.notes,
        }
    }
}

/// `time` columns come back as `HH:MM:SS`; the dashboard works in `HH:MM`.
fn clock_time(time: String) -> String {
    let bytes = time.as_bytes();
    if bytes.len() == 8 && bytes[2] == b':' && bytes[5] == b':' {
        time[..5].to_string()
    } else {
        time
    }
}

impl Store {
    pub async fn save_appointment(
        &self,
        session: &Session,
        appointment: &Appointment,
    ) -> Result<Appointment, StorageError> {
        self.save(session, appointment).await
    }

    /// The caller's appointments, earliest date first.
    pub async fn load_appointments(
        &self,
        session: &Session,
    ) -> Result<Vec<Appointment>, StorageError> {
        self.load(session).await
    }

    pub async fn delete_appointment(&self, session: &Session, id: &str) -> Result<(), StorageError> {
        self.delete::<Appointment>(session, id).await
    }

    /// Sets the status column only. Any status may follow any other.
    pub async fn update_appointment_status(
        &self,
        session: &Session,
        id: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, StorageError> {
        let mut patch = Row::new();
        patch.insert("status".to_string(), Value::String(status.to_string()));
        self.patch::<Appointment>(session, id, patch).await
    }
}
