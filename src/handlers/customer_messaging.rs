//! `ai-customer-messaging`: one ready-to-send message to a customer.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tera::Context;

use super::{BufferedTask, ChatTask};
use crate::error::HandlerError;
use crate::gateway::{ChatMessage, Provider};
use crate::model::{BusinessInfo, CustomerInfo};
use crate::prompts::{MessageType, PromptLibrary, names, or_fallback, value_text};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerMessageRequest {
    pub message_type: Option<String>,
    #[serde(deserialize_with = "super::null_as_default")]
    pub customer_info: CustomerInfo,
    #[serde(deserialize_with = "super::null_as_default")]
    pub business_info: BusinessInfo,
    pub context: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CustomerMessageResponse {
    pub message: String,
}

pub struct CustomerMessaging;

impl ChatTask for CustomerMessaging {
    const NAME: &'static str = "ai-customer-messaging";
    const PROVIDER: Provider = Provider::Gateway;

    type Request = CustomerMessageRequest;

    fn messages(
        request: &CustomerMessageRequest,
        prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError> {
        let message_type = MessageType::from_key(request.message_type.as_deref());
        let customer = &request.customer_info;
        let business = &request.business_info;

        let mut context = Context::new();
        context.insert("message_label", message_type.label());
        context.insert(
            "customer_name",
            &or_fallback(customer.name.as_deref(), "Valued Customer"),
        );
        context.insert(
            "customer_email",
            &or_fallback(customer.email.as_deref(), "Not provided"),
        );
        context.insert(
            "customer_phone",
            &or_fallback(customer.phone.as_deref(), "Not provided"),
        );
        context.insert(
            "last_visit",
            &or_fallback(customer.last_visit.as_deref(), "Unknown"),
        );
        context.insert(
            "business_name",
            &or_fallback(business.name.as_deref(), "Our Business"),
        );
        context.insert(
            "industry",
            &or_fallback(business.industry.as_deref(), "General"),
        );
        context.insert(
            "context",
            &value_text(request.context.as_ref(), "None provided"),
        );

        let user = prompts.render(names::CUSTOMER_MESSAGE, &context)?;
        Ok(vec![
            ChatMessage::system(message_type.system_prompt()),
            ChatMessage::user(user),
        ])
    }
}

impl BufferedTask for CustomerMessaging {
    type Output = CustomerMessageResponse;

    fn respond(_request: CustomerMessageRequest, content: String) -> CustomerMessageResponse {
        CustomerMessageResponse { message: content }
    }
}
