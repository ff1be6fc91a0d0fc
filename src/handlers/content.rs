//! Streaming handlers: `generate-content` and `streaming-chat`.
//!
//! Both answer with the upstream event stream untouched.

use serde::Deserialize;
use tera::Context;

use super::{ChatTask, require_text};
use crate::error::HandlerError;
use crate::gateway::{ChatMessage, Provider};
use crate::model::BusinessInfo;
use crate::prompts::{CHAT_SYSTEM, ContentType, PromptLibrary, names};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContentRequest {
    pub prompt: Option<String>,
    pub business_info: Option<BusinessInfo>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
}

pub struct GenerateContent;

impl ChatTask for GenerateContent {
    const NAME: &'static str = "generate-content";
    const PROVIDER: Provider = Provider::OpenAi;

    type Request = ContentRequest;

    fn validate(request: &ContentRequest) -> Result<(), HandlerError> {
        require_text(request.prompt.as_deref(), "prompt")
    }

    fn messages(
        request: &ContentRequest,
        prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError> {
        let content_type = ContentType::from_key(request.content_type.as_deref());

        let mut context = business_context(request.business_info.as_ref());
        context.insert("prompt", request.prompt.as_deref().unwrap_or_default().trim());
        let user = prompts.render(names::CONTENT_REQUEST, &context)?;

        Ok(vec![
            ChatMessage::system(content_type.system_prompt()),
            ChatMessage::user(user),
        ])
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreamingChatRequest {
    #[serde(deserialize_with = "super::null_as_default")]
    pub messages: Vec<ChatMessage>,
    pub business_info: Option<BusinessInfo>,
}

pub struct StreamingChat;

impl ChatTask for StreamingChat {
    const NAME: &'static str = "streaming-chat";
    const PROVIDER: Provider = Provider::Gateway;

    type Request = StreamingChatRequest;

    fn validate(request: &StreamingChatRequest) -> Result<(), HandlerError> {
        if request.messages.is_empty() {
            return Err(HandlerError::validation("messages is required"));
        }
        Ok(())
    }

    fn messages(
        request: &StreamingChatRequest,
        prompts: &PromptLibrary,
    ) -> Result<Vec<ChatMessage>, HandlerError> {
        let context = business_context(request.business_info.as_ref());
        let about = prompts.render(names::BUSINESS_CONTEXT, &context)?;
        let about = about.trim();

        let system = if about.is_empty() {
            CHAT_SYSTEM.to_string()
        } else {
            format!("{CHAT_SYSTEM}\n\n{about}")
        };

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(ChatMessage::system(system));
        messages.extend(request.messages.iter().cloned());
        Ok(messages)
    }
}

/// Template context with the business fields; blank or absent fields are `""`
/// so the templates can skip them.
fn business_context(info: Option<&BusinessInfo>) -> Context {
    fn field(value: Option<&String>) -> &str {
        value.map(|text| text.trim()).unwrap_or_default()
    }

    let mut context = Context::new();
    context.insert("business_name", field(info.and_then(|b| b.name.as_ref())));
    context.insert("industry", field(info.and_then(|b| b.industry.as_ref())));
    context.insert(
        "description",
        field(info.and_then(|b| b.description.as_ref())),
    );
    context.insert("location", field(info.and_then(|b| b.location.as_ref())));
    context.insert(
        "target_market",
        field(info.and_then(|b| b.target_market.as_ref())),
    );
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::system::content;
    use serde_json::json;

    #[test]
    fn content_type_alias_selects_prompt() {
        let prompts = PromptLibrary::new().unwrap();
        let request: ContentRequest = serde_json::from_value(json!({
            "prompt": "Announce our spring menu",
            "type": "social",
            "businessInfo": { "name": "Corner Cafe", "targetMarket": "Commuters" }
        }))
        .unwrap();

        let messages = GenerateContent::messages(&request, &prompts).unwrap();
        assert_eq!(messages[0].content, content::SOCIAL_MEDIA);
        assert!(messages[1].content.starts_with("Announce our spring menu"));
        assert!(messages[1].content.contains("- Name: Corner Cafe"));
        assert!(messages[1].content.contains("- Target market: Commuters"));
        assert!(!messages[1].content.contains("Industry"));
    }

    #[test]
    fn content_without_business_is_just_the_prompt() {
        let prompts = PromptLibrary::new().unwrap();
        let request: ContentRequest =
            serde_json::from_value(json!({ "prompt": "Write a tagline" })).unwrap();

        let messages = GenerateContent::messages(&request, &prompts).unwrap();
        assert_eq!(messages[0].content, content::GENERAL);
        assert_eq!(messages[1].content, "Write a tagline");
    }

    #[test]
    fn chat_system_prompt_mentions_the_business() {
        let prompts = PromptLibrary::new().unwrap();
        let request: StreamingChatRequest = serde_json::from_value(json!({
            "messages": [{ "role": "user", "content": "Hi" }],
            "businessInfo": { "name": "Corner Cafe", "industry": "Hospitality" }
        }))
        .unwrap();

        let messages = StreamingChat::messages(&request, &prompts).unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.starts_with(CHAT_SYSTEM));
        assert!(messages[0].content.contains("Corner Cafe in the Hospitality industry"));
        assert_eq!(messages[1], ChatMessage::user("Hi"));
    }

    #[test]
    fn chat_without_business_uses_plain_system_prompt() {
        let prompts = PromptLibrary::new().unwrap();
        let request: StreamingChatRequest = serde_json::from_value(json!({
            "messages": [{ "role": "user", "content": "Hi" }]
        }))
        .unwrap();

        let messages = StreamingChat::messages(&request, &prompts).unwrap();
        assert_eq!(messages[0].content, CHAT_SYSTEM);
    }

    #[test]
    fn empty_messages_are_rejected() {
        let request = StreamingChatRequest::default();
        assert!(matches!(
            StreamingChat::validate(&request),
            Err(HandlerError::Validation(_))
        ));
        assert!(matches!(
            GenerateContent::validate(&ContentRequest::default()),
            Err(HandlerError::Validation(_))
        ));
    }
}
