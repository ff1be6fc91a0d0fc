//! `ai-appointment-reminders`: reminder text for one appointment.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Context;

use super::{BufferedTask, ChatTask};
use crate::error::HandlerError;
use crate::gateway::{ChatMessage, Provider};
use crate::model::BusinessInfo;
use crate::prompts::{
    APPOINTMENT_REMINDER_SYSTEM, PromptLibrary, ReminderType, names, or_fallback, value_text,
};

/// Appointment as the dashboard sends it; every field is optional here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderAppointment {
    pub title: Option<String>,
    pub customer_name: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    /// Minutes, as a number or text.
    pub duration: Option<Value>,
    pub service_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReminderRequest {
    #[serde(deserialize_with = "super::null_as_default")]
    pub appointment: ReminderAppointment,
    #[serde(deserialize_with = "super::null_as_default")]
    pub business_info: BusinessInfo,
    pub reminder_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub reminder: String,
}

pub struct AppointmentReminders;

impl ChatTask for AppointmentReminders {
    const NAME: &'static str = "ai-appointment-reminders";
    const PROVIDER: Provider = Provider::Gateway;

    type Request = ReminderRequest;

    fn messages(
        request: &ReminderRequest,
        prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError> {
        let reminder_type = ReminderType::from_key(request.reminder_type.as_deref());
        let appointment = &request.appointment;
        let business = &request.business_info;

        let duration = match appointment.duration.as_ref() {
            Some(Value::Number(minutes)) => format!("{minutes} minutes"),
            other => value_text(other, "Not specified"),
        };

        let mut context = Context::new();
        context.insert("instruction", reminder_type.instruction());
        context.insert(
            "appointment_title",
            &or_fallback(appointment.title.as_deref(), "Appointment"),
        );
        context.insert(
            "customer_name",
            &or_fallback(appointment.customer_name.as_deref(), "Valued Customer"),
        );
        context.insert("date", &or_fallback(appointment.date.as_deref(), "TBD"));
        context.insert("time", &or_fallback(appointment.time.as_deref(), "TBD"));
        context.insert("duration", &duration);
        context.insert(
            "service_name",
            &or_fallback(appointment.service_name.as_deref(), "Not specified"),
        );
        context.insert("notes", &or_fallback(appointment.notes.as_deref(), "None"));
        context.insert(
            "business_name",
            &or_fallback(business.name.as_deref(), "Our Business"),
        );
        context.insert(
            "location",
            &or_fallback(business.location.as_deref(), "Not specified"),
        );
        context.insert(
            "business_phone",
            &or_fallback(business.phone.as_deref(), "Not provided"),
        );

        let user = prompts.render(names::APPOINTMENT_REMINDER, &context)?;
        Ok(vec![
            ChatMessage::system(APPOINTMENT_REMINDER_SYSTEM),
            ChatMessage::user(user),
        ])
    }
}

impl BufferedTask for AppointmentReminders {
    type Output = ReminderResponse;

    fn respond(_request: ReminderRequest, content: String) -> ReminderResponse {
        ReminderResponse { reminder: content }
    }
}
