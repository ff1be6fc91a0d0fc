//! Prompt selection and rendering.
//!
//! System prompts are chosen by a caller-supplied key from closed enums;
//! unknown keys select the enum's default variant. User prompts are Tera
//! templates rendered from a context in which every optional field already
//! carries its fallback text.

pub mod system;
mod templates;

use serde_json::Value;
use std::str::FromStr;
use tera::{Context, Tera};

pub use system::{
    APPOINTMENT_REMINDER_SYSTEM, ASSISTANT_SYSTEM, BUSINESS_PLAN_SYSTEM, CHAT_SYSTEM,
    FINANCIAL_FORECAST_SYSTEM, MARKETING_IDEAS_SYSTEM, TASK_SUGGESTIONS_SYSTEM,
};

/// Template names registered in [`PromptLibrary`].
pub mod names {
    pub const CUSTOMER_MESSAGE: &str = "customer_message";
    pub const APPOINTMENT_REMINDER: &str = "appointment_reminder";
    pub const FINANCIAL_FORECAST: &str = "financial_forecast";
    pub const MARKETING_IDEAS: &str = "marketing_ideas";
    pub const TASK_SUGGESTIONS: &str = "task_suggestions";
    pub const BUSINESS_PLAN: &str = "business_plan";
    pub const CONTENT_REQUEST: &str = "content_request";
    pub const BUSINESS_CONTEXT: &str = "business_context";
}

/// Compiled user-prompt templates.
pub struct PromptLibrary {
    tera: Tera,
}

impl PromptLibrary {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.add_raw_templates(templates::ALL.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(name, context)
    }

    pub fn template_names(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

/// Kind of outbound customer message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum MessageType {
    #[strum(serialize = "appointment_confirmation")]
    AppointmentConfirmation,
    #[strum(serialize = "appointment_reminder")]
    AppointmentReminder,
    #[strum(serialize = "follow_up")]
    FollowUp,
    #[strum(serialize = "thank_you")]
    ThankYou,
    #[strum(serialize = "promotional")]
    Promotional,
    #[strum(serialize = "feedback_request")]
    FeedbackRequest,
    #[strum(serialize = "welcome")]
    Welcome,
    #[default]
    #[strum(serialize = "general")]
    General,
}

impl MessageType {
    pub fn from_key(key: Option<&str>) -> Self {
        parse_key(key)
    }

    pub fn system_prompt(self) -> &'static str {
        use system::messaging::*;
        match self {
            MessageType::AppointmentConfirmation => APPOINTMENT_CONFIRMATION,
            MessageType::AppointmentReminder => APPOINTMENT_REMINDER,
            MessageType::FollowUp => FOLLOW_UP,
            MessageType::ThankYou => THANK_YOU,
            MessageType::Promotional => PROMOTIONAL,
            MessageType::FeedbackRequest => FEEDBACK_REQUEST,
            MessageType::Welcome => WELCOME,
            MessageType::General => GENERAL,
        }
    }

    /// Phrase used inside the user prompt.
    pub fn label(self) -> &'static str {
        match self {
            MessageType::AppointmentConfirmation => "appointment confirmation",
            MessageType::AppointmentReminder => "appointment reminder",
            MessageType::FollowUp => "follow-up",
            MessageType::ThankYou => "thank-you",
            MessageType::Promotional => "promotional",
            MessageType::FeedbackRequest => "feedback request",
            MessageType::Welcome => "welcome",
            MessageType::General => "customer",
        }
    }
}

/// When, relative to the appointment, a reminder is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ReminderType {
    #[strum(serialize = "24h", serialize = "day_before")]
    DayBefore,
    #[strum(serialize = "1h", serialize = "hour_before")]
    HourBefore,
    #[strum(serialize = "confirmation")]
    Confirmation,
    #[strum(serialize = "follow_up")]
    FollowUp,
    #[default]
    #[strum(serialize = "standard")]
    Standard,
}

impl ReminderType {
    pub fn from_key(key: Option<&str>) -> Self {
        parse_key(key)
    }

    /// Timing instruction folded into the reminder system prompt.
    pub fn instruction(self) -> &'static str {
        match self {
            ReminderType::DayBefore => {
                "The appointment is tomorrow. Remind the customer of the date and time and invite them to reschedule if needed."
            }
            ReminderType::HourBefore => {
                "The appointment starts in about an hour. Keep it very short, suitable for SMS."
            }
            ReminderType::Confirmation => {
                "The appointment was just booked. Confirm the details and thank the customer."
            }
            ReminderType::FollowUp => {
                "The appointment has taken place. Thank the customer and invite them to book again."
            }
            ReminderType::Standard => {
                "Remind the customer about their upcoming appointment with all the key details."
            }
        }
    }
}

/// Kind of marketing content requested from the content generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::EnumString, strum::EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ContentType {
    #[strum(serialize = "social_media", serialize = "social")]
    SocialMedia,
    #[strum(serialize = "email")]
    Email,
    #[strum(serialize = "blog_post", serialize = "blog")]
    BlogPost,
    #[strum(serialize = "ad_copy", serialize = "ad")]
    AdCopy,
    #[strum(serialize = "product_description")]
    ProductDescription,
    #[strum(serialize = "website_copy", serialize = "website")]
    WebsiteCopy,
    #[default]
    #[strum(serialize = "general")]
    General,
}

impl ContentType {
    pub fn from_key(key: Option<&str>) -> Self {
        parse_key(key)
    }

    pub fn system_prompt(self) -> &'static str {
        use system::content::*;
        match self {
            ContentType::SocialMedia => SOCIAL_MEDIA,
            ContentType::Email => EMAIL,
            ContentType::BlogPost => BLOG_POST,
            ContentType::AdCopy => AD_COPY,
            ContentType::ProductDescription => PRODUCT_DESCRIPTION,
            ContentType::WebsiteCopy => WEBSITE_COPY,
            ContentType::General => GENERAL,
        }
    }
}

fn parse_key<T: FromStr + Default>(key: Option<&str>) -> T {
    key.map(str::trim)
        .and_then(|key| key.parse().ok())
        .unwrap_or_default()
}

/// `value` unless it is absent or blank, in which case `fallback`.
pub fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Renders a loosely typed JSON field as prompt text.
///
/// Strings are used as-is, numbers and booleans are printed, structures are
/// pretty-printed JSON. Null, blank strings and empty structures fall back.
pub fn value_text(value: Option<&Value>, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(Value::String(text)) => or_fallback(Some(text), fallback),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Array(items)) if items.is_empty() => fallback.to_string(),
        Some(Value::Object(map)) if map.is_empty() => fallback.to_string(),
        Some(other) => {
            serde_json::to_string_pretty(other).unwrap_or_else(|_| fallback.to_string())
        }
    }
}
