//! Application-facing records and shared request fragments.
//!
//! Records use camelCase on the wire; the storage layer owns the translation
//! to snake_case table rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::extract::string_field;

/// Appointment lifecycle. Any status may be set from any other.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    pub date: NaiveDate,
    /// Local wall-clock time, `HH:MM`.
    pub time: String,
    /// Minutes.
    pub duration: i32,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes.
    pub duration: i32,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
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

/// The eight free-text sections of a business plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanSections {
    pub executive_summary: String,
    pub company_description: String,
    pub market_analysis: String,
    pub competitive_analysis: String,
    pub marketing_strategy: String,
    pub operations_plan: String,
    pub financial_projections: String,
    pub funding_requirements: String,
}

impl PlanSections {
    pub const KEYS: [&'static str; 8] = [
        "executiveSummary",
        "companyDescription",
        "marketAnalysis",
        "competitiveAnalysis",
        "marketingStrategy",
        "operationsPlan",
        "financialProjections",
        "fundingRequirements",
    ];

    /// Keeps only the known keys; anything missing or not a string is `""`.
    pub fn from_model_output(map: &Map<String, Value>) -> Self {
        Self {
            executive_summary: string_field(map, "executiveSummary"),
            company_description: string_field(map, "companyDescription"),
            market_analysis: string_field(map, "marketAnalysis"),
            competitive_analysis: string_field(map, "competitiveAnalysis"),
            marketing_strategy: string_field(map, "marketingStrategy"),
            operations_plan: string_field(map, "operationsPlan"),
            financial_projections: string_field(map, "financialProjections"),
            funding_requirements: string_field(map, "fundingRequirements"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(flatten)]
    pub sections: PlanSections,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Business profile fields callers attach to prompt requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessInfo {
    #[serde(alias = "businessName")]
    pub name: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub target_market: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub last_visit: Option<String>,
}
